//! The line editor: a [`CString`] plus a logical cursor, word-wise
//! navigation, and history integration.

use crate::cstring::CString;
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::utf8::Char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Whitespace,
    Word,
}

fn is_delim(ch: Char) -> bool {
    let b = ch.first_byte();
    b.is_ascii() && (b.is_ascii_punctuation() || b.is_ascii_whitespace())
}

/// Number of steps required to cross the current run, starting from the
/// character adjacent to `pos` in the scan direction.
///
/// `target == Whitespace` scans while characters are non-delimiters and
/// stops on the first delimiter (distance to the end of a word run);
/// `target == Word` scans while characters are delimiters and stops on the
/// first non-delimiter (distance to the start of a word run). Absence of
/// any adjacent character (string boundary) is reported as a sentinel
/// distance of 1, which callers use to detect "we're already at a
/// boundary".
fn goto_token(chars: &[Char], pos: usize, behind: bool, target: Token) -> usize {
    let len = chars.len();

    let mut idx: Option<usize> = if pos < len {
        if behind {
            pos.checked_sub(1)
        } else if pos + 1 < len {
            Some(pos + 1)
        } else {
            None
        }
    } else if behind {
        len.checked_sub(1)
    } else {
        return 0;
    };

    let mut steps = 1usize;
    while let Some(i) = idx {
        let stop = match target {
            Token::Whitespace => is_delim(chars[i]),
            Token::Word => !is_delim(chars[i]),
        };
        if stop {
            break;
        }
        steps += 1;
        idx = if behind {
            i.checked_sub(1)
        } else if i + 1 < len {
            Some(i + 1)
        } else {
            None
        };
    }
    steps
}

/// Holds exclusive ownership of one [`CString`] and the cursor state that
/// moves through it.
#[derive(Debug, Clone)]
pub struct Editor {
    line: CString,
    cursor_pos: usize,
    capacity: usize,
    /// `None` means "editing a fresh line not yet in history"; `Some(i)`
    /// is the index of the history entry currently loaded into the buffer.
    history_sel: Option<usize>,
}

impl Editor {
    /// `capacity` is the caller's output-buffer size; the editor never
    /// lets `line.size()` exceed `capacity - 1` so a null terminator always
    /// fits.
    pub fn new(capacity: usize) -> Self {
        Editor {
            line: CString::new(),
            cursor_pos: 0,
            capacity,
            history_sel: None,
        }
    }

    pub fn line(&self) -> &CString {
        &self.line
    }

    /// Rebinds the output-buffer capacity this editor enforces against,
    /// per call: `readline`/`getc` take a caller-supplied buffer whose
    /// size may differ between calls on the same session.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// Inserts `ch` at the cursor. Silently rejects the keystroke (leaving
    /// the editor state unchanged) if it would overflow the output buffer
    /// capacity, per the capacity-error policy: no error is surfaced, the
    /// next Enter still produces a valid line.
    pub fn put(&mut self, ch: Char) -> Result<()> {
        if self.line.size() + ch.size() > self.capacity.saturating_sub(1) {
            return Err(Error::BufferTooSmall);
        }
        self.line.insert(self.cursor_pos, ch)?;
        self.cursor_pos += 1;
        Ok(())
    }

    /// Removes `count` characters; `forward` erases ahead of the cursor
    /// without moving it, backward erases behind the cursor and moves it
    /// back by `count`.
    pub fn erase(&mut self, count: usize, forward: bool) -> Result<()> {
        self.line.erase(self.cursor_pos, count, forward)?;
        if !forward {
            self.cursor_pos -= count;
        }
        Ok(())
    }

    pub fn move_right(&mut self, steps: usize) {
        self.cursor_pos = (self.cursor_pos + steps).min(self.line.length());
    }

    pub fn move_left(&mut self, steps: usize) {
        self.cursor_pos = self.cursor_pos.saturating_sub(steps);
    }

    fn chars(&self) -> Vec<Char> {
        self.line.chars().collect()
    }

    /// Ctrl+Right: jump to the end of the delimiter run if already on one,
    /// otherwise to the end of the current word.
    pub fn word_right(&mut self) {
        if self.cursor_pos >= self.line.length() {
            return;
        }
        let chars = self.chars();
        let next_ws = goto_token(&chars, self.cursor_pos, false, Token::Whitespace);
        let count = if next_ws <= 1 {
            goto_token(&chars, self.cursor_pos, false, Token::Word)
        } else {
            next_ws
        };
        self.move_right(count);
    }

    /// Ctrl+Left: the documented net effect is "move to the start of the
    /// previous non-delimiter run" — crossing a trailing delimiter run
    /// first, then the word run behind it, when the cursor starts adjacent
    /// to a delimiter.
    pub fn word_left(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        let chars = self.chars();
        let next_ws = goto_token(&chars, self.cursor_pos, true, Token::Whitespace);
        let count = if next_ws <= 1 {
            let skip = goto_token(&chars, self.cursor_pos, true, Token::Word);
            self.move_left(skip);
            goto_token(&chars, self.cursor_pos, true, Token::Whitespace).saturating_sub(1)
        } else {
            next_ws - 1
        };
        self.move_left(count);
    }

    /// Ctrl+Backspace: identical word-boundary logic to [`Self::word_left`],
    /// erasing instead of moving.
    pub fn word_backspace(&mut self) -> Result<()> {
        if self.cursor_pos == 0 {
            return Ok(());
        }
        let chars = self.chars();
        let next_ws = goto_token(&chars, self.cursor_pos, true, Token::Whitespace);
        let count = if next_ws <= 1 {
            let skip = goto_token(&chars, self.cursor_pos, true, Token::Word);
            self.erase(skip, false)?;
            let chars = self.chars();
            goto_token(&chars, self.cursor_pos, true, Token::Whitespace).saturating_sub(1)
        } else {
            next_ws - 1
        };
        self.erase(count, false)
    }

    /// Ctrl+Delete: identical word-boundary logic to [`Self::word_right`],
    /// erasing instead of moving.
    pub fn word_delete(&mut self) -> Result<()> {
        if self.cursor_pos >= self.line.length() {
            return Ok(());
        }
        let chars = self.chars();
        let next_ws = goto_token(&chars, self.cursor_pos, false, Token::Whitespace);
        let count = if next_ws <= 1 {
            let skip = goto_token(&chars, self.cursor_pos, false, Token::Word);
            self.erase(skip, true)?;
            let chars = self.chars();
            goto_token(&chars, self.cursor_pos, false, Token::Whitespace)
        } else {
            next_ws
        };
        self.erase(count, true)
    }

    /// Frees every character, resetting the editor to an empty fresh line.
    pub fn clear(&mut self) {
        self.line.clear();
        self.cursor_pos = 0;
    }

    /// Preloads the buffer with `text` ahead of the next render, per the
    /// `setline` entry point. Cursor lands at the end of the line.
    pub fn setline(&mut self, text: &str) -> Result<()> {
        let candidate = CString::from_str(text);
        if candidate.size() > self.capacity.saturating_sub(1) {
            return Err(Error::BufferTooSmall);
        }
        self.line = candidate;
        self.cursor_pos = self.line.length();
        Ok(())
    }

    /// Up-arrow history navigation: snapshots a fresh, non-empty line into
    /// history before stepping backward through it.
    pub fn history_up(&mut self, history: &mut HistoryStore) {
        let sel = match self.history_sel {
            Some(sel) => sel,
            None => {
                let sel = history.len();
                self.history_sel = Some(sel);
                if !self.line.is_empty() && history.len() > 0 {
                    let _ = history.append(self.line.clone());
                }
                sel
            }
        };
        if sel > 0 {
            let new_sel = sel - 1;
            self.history_sel = Some(new_sel);
            self.clear();
            if let Some(entry) = history.get(new_sel) {
                self.line = entry.clone();
                self.cursor_pos = self.line.length();
            }
        }
    }

    /// Down-arrow history navigation: steps forward through history, or
    /// clears back to a fresh line once the newest entry is passed.
    pub fn history_down(&mut self, history: &HistoryStore) {
        match self.history_sel {
            Some(sel) if sel < history.len().saturating_sub(1) => {
                let new_sel = sel + 1;
                self.history_sel = Some(new_sel);
                self.clear();
                if let Some(entry) = history.get(new_sel) {
                    self.line = entry.clone();
                    self.cursor_pos = self.line.length();
                }
            }
            _ if history.len() > 0 => {
                self.clear();
                self.history_sel = None;
            }
            _ => {}
        }
    }

    /// Enter: appends the current line to history, serializes it into
    /// `out`, clears the editor, and returns the byte count written
    /// (excluding the null terminator).
    pub fn accept(&mut self, out: &mut [u8], history: &mut HistoryStore) -> Result<usize> {
        let written = self.line.write_into(out)?;
        let _ = history.append(self.line.clone());
        self.clear();
        Ok(written)
    }

    /// Ctrl-C: best-effort serialization of whatever was being edited.
    pub fn interrupt(&mut self, out: &mut [u8]) -> usize {
        self.line.write_into(out).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(text: &str) -> Editor {
        let mut e = Editor::new(1024);
        e.setline(text).unwrap();
        e
    }

    #[test]
    fn put_appends_and_advances_cursor() {
        let mut e = Editor::new(64);
        for ch in "hello, world".chars() {
            e.put(Char::from_char(ch)).unwrap();
        }
        assert_eq!(e.line().to_string(), "hello, world");
        assert_eq!(e.cursor_pos(), 12);
    }

    #[test]
    fn put_rejects_when_buffer_would_overflow() {
        let mut e = Editor::new(2); // capacity for exactly one ASCII byte + NUL
        e.put(Char::from_char('a')).unwrap();
        assert!(matches!(
            e.put(Char::from_char('b')),
            Err(Error::BufferTooSmall)
        ));
        assert_eq!(e.line().to_string(), "a");
    }

    #[test]
    fn move_left_and_right_saturate() {
        let mut e = editor_with("abc");
        e.move_left(100);
        assert_eq!(e.cursor_pos(), 0);
        e.move_right(100);
        assert_eq!(e.cursor_pos(), 3);
    }

    #[test]
    fn word_jumps_are_monotone() {
        let mut e = editor_with("hello world sailor");
        let start = e.cursor_pos();
        e.move_left(start);
        let before = e.cursor_pos();
        e.word_right();
        assert!(e.cursor_pos() >= before);
        let before = e.cursor_pos();
        e.word_left();
        assert!(e.cursor_pos() <= before);
    }

    #[test]
    fn ctrl_left_reaches_start_of_previous_word() {
        let mut e = editor_with("hello world sailor");
        // cursor at end, sitting right after "sailor"
        e.word_left();
        assert_eq!(e.cursor_pos(), 12); // start of "sailor"
        e.word_left();
        assert_eq!(e.cursor_pos(), 6); // start of "world"
        e.word_left();
        assert_eq!(e.cursor_pos(), 0); // start of "hello"
    }

    #[test]
    fn ctrl_backspace_deletes_previous_word() {
        let mut e = editor_with("hello world sailor");
        e.word_backspace().unwrap();
        assert_eq!(e.line().to_string(), "hello world ");
    }

    #[test]
    fn history_up_then_down_restores_fresh_line() {
        let mut history = HistoryStore::new(16, 128);
        history.append(CString::from_str("first")).unwrap();
        history.append(CString::from_str("second")).unwrap();

        let mut e = editor_with("draft");
        e.history_up(&mut history);
        assert_eq!(e.line().to_string(), "second");
        e.history_up(&mut history);
        assert_eq!(e.line().to_string(), "first");
        e.history_down(&mut history);
        assert_eq!(e.line().to_string(), "second");
        e.history_down(&mut history);
        assert_eq!(e.line().to_string(), "draft");
    }

    #[test]
    fn accept_clears_editor_and_appends_history() {
        let mut history = HistoryStore::new(16, 128);
        let mut e = editor_with("hello, world");
        let mut buf = [0u8; 64];
        let n = e.accept(&mut buf, &mut history).unwrap();
        assert_eq!(&buf[..n], b"hello, world");
        assert_eq!(e.line().length(), 0);
        assert_eq!(history.len(), 1);
    }
}
