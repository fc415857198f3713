//! A bounded, ordered history of past lines, plus optional plain-text file
//! persistence.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use log::trace;

use crate::cstring::CString;
use crate::error::Result;

pub const DEFAULT_INIT_CAPACITY: usize = 16;
pub const DEFAULT_MAX_CAPACITY: usize = 128;

/// Process-wide ordered sequence of past lines. No two adjacent entries are
/// ever byte-identical; entries are rejected outright once `max_capacity`
/// is reached rather than evicted (see the open question on history limits
/// in the design notes — FIFO eviction is a documented non-default, not
/// implemented here).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<CString>,
    max_capacity: usize,
}

impl HistoryStore {
    pub fn new(init_capacity: usize, max_capacity: usize) -> Self {
        HistoryStore {
            entries: Vec::with_capacity(init_capacity.min(max_capacity)),
            max_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CString> {
        self.entries.get(index)
    }

    /// Appends `line`, rejecting empty strings, an exact duplicate of the
    /// most recent entry, or an append once `max_capacity` is reached.
    /// Returns whether the entry was actually stored.
    pub fn append(&mut self, line: CString) -> Result<bool> {
        if line.is_empty() {
            return Ok(false);
        }
        if let Some(last) = self.entries.last() {
            if *last == line {
                return Ok(false);
            }
        }
        if self.entries.len() >= self.max_capacity {
            trace!("history at max capacity ({}), append rejected", self.max_capacity);
            return Ok(false);
        }
        self.entries.try_reserve(1).map_err(|_| crate::error::Error::Allocation)?;
        self.entries.push(line);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Loads history from a plain-text file, one newline-terminated UTF-8
    /// line per entry, in chronological order. Lines containing embedded
    /// NULs are rejected. Appended to whatever history already exists,
    /// subject to the same de-dup and capacity rules as [`Self::append`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::open(path)?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.contains('\0') {
                continue;
            }
            let _ = self.append(CString::from_str(&line));
        }
        Ok(())
    }

    /// Writes every current entry to `path`, one newline-terminated UTF-8
    /// line per entry, in chronological order. Creates or truncates the
    /// target file.
    pub fn dump(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = File::create(path)?;
        for entry in &self.entries {
            writeln!(file, "{}", entry)?;
        }
        Ok(())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        HistoryStore::new(DEFAULT_INIT_CAPACITY, DEFAULT_MAX_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_adjacent_identical_entries() {
        let mut h = HistoryStore::default();
        assert!(h.append(CString::from_str("ls")).unwrap());
        assert!(!h.append(CString::from_str("ls")).unwrap());
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn rejects_empty_lines() {
        let mut h = HistoryStore::default();
        assert!(!h.append(CString::from_str("")).unwrap());
        assert_eq!(h.len(), 0);
    }

    #[test]
    fn rejects_appends_past_max_capacity() {
        let mut h = HistoryStore::new(2, 2);
        assert!(h.append(CString::from_str("a")).unwrap());
        assert!(h.append(CString::from_str("b")).unwrap());
        assert!(!h.append(CString::from_str("c")).unwrap());
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn dump_then_load_round_trips() {
        let mut h = HistoryStore::default();
        h.append(CString::from_str("первая строка")).unwrap();
        h.append(CString::from_str("second line")).unwrap();

        let dir = std::env::temp_dir();
        let path = dir.join(format!("rawline-history-test-{}.txt", std::process::id()));
        h.dump(&path).unwrap();

        let mut loaded = HistoryStore::default();
        loaded.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(0).unwrap().to_string(), "первая строка");
        assert_eq!(loaded.get(1).unwrap().to_string(), "second line");
    }
}
