//! `rawline` — a minimal, self-contained line-editing library for
//! UTF-8-aware, raw-mode terminals.
//!
//! The pieces compose bottom-up: [`utf8`] decodes one character at a time,
//! [`cstring`] holds them as an editable sequence, [`editor`] adds a cursor
//! and word-wise navigation, [`escape`] turns terminal bytes into
//! keystroke events, [`render`] turns editor state back into terminal
//! bytes, and [`history`] and [`completion`] are the two optional
//! collaborators. [`api::RawLine`] is the entry point that wires all of
//! it to a real (or test) terminal.
//!
//! ```no_run
//! use rawline::{Config, RawLine};
//!
//! let mut rl = RawLine::init(Config::default())?;
//! let mut buf = [0u8; 256];
//! match rl.readline("> ", &mut buf) {
//!     Ok(_) => { /* `buf` holds the null-terminated line */ }
//!     Err(e) => eprintln!("{e}"),
//! }
//! # Ok::<(), rawline::Error>(())
//! ```

pub mod api;
pub mod completion;
pub mod config;
pub mod cstring;
pub mod editor;
pub mod error;
pub mod escape;
pub mod history;
pub mod key;
pub mod render;
pub mod term;
pub mod utf8;

pub use api::RawLine;
pub use completion::{CompletionTree, NodeHandle};
pub use config::Config;
pub use cstring::CString;
pub use editor::Editor;
pub use error::{Error, ReadCode, Result};
pub use history::HistoryStore;
pub use key::{Key, KeyEvent, Modifiers};
pub use utf8::Char;
