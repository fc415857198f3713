//! Build/runtime knobs, expressed as an ordinary value overridable before
//! [`crate::init`] rather than as preprocessor `#define`s.

use crate::history::{DEFAULT_INIT_CAPACITY, DEFAULT_MAX_CAPACITY};

/// Tunables for a single [`crate::RawLine`] session.
#[derive(Debug, Clone)]
pub struct Config {
    /// History's initial backing capacity.
    pub history_init_capacity: usize,
    /// History's maximum number of entries; further appends are rejected
    /// once reached.
    pub history_max_capacity: usize,
    /// Use the `\x1b[999C` + `\x1b[6n` cursor-position query as a terminal
    /// size fallback instead of the native ioctl/console call. Mirrors the
    /// `size_query_escapes` Cargo feature for callers who want to choose
    /// this at runtime rather than at compile time.
    pub size_query_escapes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_init_capacity: DEFAULT_INIT_CAPACITY,
            history_max_capacity: DEFAULT_MAX_CAPACITY,
            size_query_escapes: cfg!(feature = "size_query_escapes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_history_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.history_init_capacity, DEFAULT_INIT_CAPACITY);
        assert_eq!(cfg.history_max_capacity, DEFAULT_MAX_CAPACITY);
    }
}
