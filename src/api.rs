//! The public entry points: `init`/`exit`, `readline`/`getc`, `setline`,
//! completion registration, and history persistence, all bundled behind
//! one [`RawLine`] handle so a host application never touches the raw
//! terminal, editor, or history types directly.

use log::trace;

use crate::completion::{CompletionTree, NodeHandle};
use crate::config::Config;
use crate::editor::Editor;
use crate::error::{ReadCode, Result};
use crate::escape::parse_event;
use crate::history::HistoryStore;
use crate::key::{Key, KeyEvent};
use crate::render::render;
use crate::term::{self, PlatformTerminal, RawTerminal};
use crate::utf8;

/// Used when the terminal's width can't be determined, per the policy in
/// §7: treat it as a single extremely wide column so no wrapping happens.
const UNKNOWN_WIDTH_COLUMNS: usize = 1_000_000;

/// A session bound to one raw-mode terminal, one [`Editor`], one
/// [`HistoryStore`], and one [`CompletionTree`].
///
/// Generic over the terminal backend so tests can drive the read loop
/// against a canned [`RawTerminal`] instead of a real console; callers
/// reach for [`RawLine::init`], which selects the platform backend.
pub struct RawLine<T: RawTerminal = PlatformTerminal> {
    term: T,
    editor: Editor,
    history: HistoryStore,
    completion: CompletionTree,
    config: Config,
    last_control: Option<KeyEvent>,
}

enum StepResult {
    Continue { was_char: bool },
    Enter(usize),
    Interrupt(usize),
}

impl RawLine<PlatformTerminal> {
    /// Acquires raw mode on the controlling terminal and allocates the
    /// editor's supporting state. On error, raw mode is not entered and no
    /// resources are allocated.
    pub fn init(config: Config) -> Result<Self> {
        let term = term::enter()?;
        Ok(Self::with_terminal(term, config))
    }
}

impl<T: RawTerminal> RawLine<T> {
    /// Builds a session around an already-acquired terminal backend.
    /// Exposed so tests (and embedders with their own raw-mode setup) can
    /// supply a backend other than the platform default.
    pub fn with_terminal(term: T, config: Config) -> Self {
        RawLine {
            term,
            // Rebound to the caller's actual buffer length at the start of
            // every `readline`/`getc` call; this placeholder only matters
            // for a `setline` issued before the first call.
            editor: Editor::new(usize::MAX),
            history: HistoryStore::new(config.history_init_capacity, config.history_max_capacity),
            completion: CompletionTree::new(),
            last_control: None,
            config,
        }
    }

    /// Restores the terminal and releases the session's state. Equivalent
    /// to dropping the handle; kept as an explicit call for callers who
    /// want the teardown to be visible at the call site.
    pub fn exit(self) {
        drop(self);
    }

    fn columns(&mut self) -> usize {
        if self.config.size_query_escapes {
            return self.columns_via_escape_query().unwrap_or(UNKNOWN_WIDTH_COLUMNS);
        }
        self.term.columns().unwrap_or(UNKNOWN_WIDTH_COLUMNS)
    }

    /// Fallback terminal-size probe: push the cursor far right, ask it to
    /// report its position, and parse the `\x1b[<row>;<col>R` reply.
    fn columns_via_escape_query(&mut self) -> Result<usize> {
        self.term.write_all(b"\x1b[999C\x1b[6n")?;

        // Skip the `ESC [` introducer.
        loop {
            if self.term.read_byte()? == b'[' {
                break;
            }
        }

        let mut digits = Vec::new();
        loop {
            match self.term.read_byte()? {
                b';' => break,
                b => digits.push(b),
            }
        }
        let _rows: usize = std::str::from_utf8(&digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        digits.clear();
        loop {
            match self.term.read_byte()? {
                b'R' => break,
                b => digits.push(b),
            }
        }
        std::str::from_utf8(&digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(crate::error::Error::OutOfBounds)
    }

    fn render_now(&mut self, prompt: &str, prev_wrap_rows: usize) -> Result<usize> {
        let cols = self.columns();
        let (bytes, wrap_rows) = render(&self.editor, prompt, cols, prev_wrap_rows);
        self.term.write_all(&bytes)?;
        Ok(wrap_rows)
    }

    /// Reads and applies exactly one keystroke.
    fn step(&mut self, out: &mut [u8]) -> Result<StepResult> {
        let first_byte = self.term.read_byte()?;
        let mut last_byte = first_byte;
        let event = {
            let term = &mut self.term;
            let mut source = || -> Result<u8> {
                let b = term.read_byte()?;
                last_byte = b;
                Ok(b)
            };
            parse_event(first_byte, &mut source)?
        };

        match event.key {
            Key::Enter => {
                let n = self.editor.accept(out, &mut self.history)?;
                self.term.write_all(b"\r\n")?;
                Ok(StepResult::Enter(n))
            }
            Key::Interrupt => {
                let n = self.editor.interrupt(out);
                Ok(StepResult::Interrupt(n))
            }
            Key::Char => {
                let ch = utf8::parse(last_byte, || self.term.read_byte())?;
                // A capacity rejection just drops the keystroke; the
                // editor state is left unchanged, per the capacity-error
                // policy.
                let _ = self.editor.put(ch);
                Ok(StepResult::Continue { was_char: true })
            }
            Key::Backspace => {
                if event.ctrl() {
                    self.editor.word_backspace()?;
                } else if self.editor.cursor_pos() > 0 {
                    self.editor.erase(1, false)?;
                }
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Delete => {
                if event.ctrl() {
                    self.editor.word_delete()?;
                } else if self.editor.cursor_pos() < self.editor.line().length() {
                    self.editor.erase(1, true)?;
                }
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Left => {
                if event.ctrl() {
                    self.editor.word_left();
                } else {
                    self.editor.move_left(1);
                }
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Right => {
                if event.ctrl() {
                    self.editor.word_right();
                } else {
                    self.editor.move_right(1);
                }
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Home => {
                self.editor.move_left(self.editor.cursor_pos());
                Ok(StepResult::Continue { was_char: false })
            }
            Key::End => {
                let len = self.editor.line().length();
                self.editor.move_right(len);
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Up => {
                self.editor.history_up(&mut self.history);
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Down => {
                self.editor.history_down(&self.history);
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Tab => {
                self.complete_word_under_cursor()?;
                Ok(StepResult::Continue { was_char: false })
            }
            Key::Unknown => {
                trace!("ignoring unrecognized keystroke");
                Ok(StepResult::Continue { was_char: false })
            }
        }
        .map(|result| {
            if !matches!(
                event.key,
                Key::Enter | Key::Interrupt | Key::Char
            ) {
                self.last_control = Some(event);
            }
            result
        })
    }

    /// Looks up the delimited run ending at the cursor against the
    /// completion tree and, on a single unambiguous match, replaces it in
    /// place.
    fn complete_word_under_cursor(&mut self) -> Result<()> {
        let cursor = self.editor.cursor_pos();
        let chars: Vec<_> = self.editor.line().chars().collect();
        let mut start = cursor;
        while start > 0 {
            let ch = chars[start - 1];
            if ch.size() == 1 && (ch.first_byte().is_ascii_punctuation() || ch.first_byte().is_ascii_whitespace()) {
                break;
            }
            start -= 1;
        }
        let prefix: String = chars[start..cursor].iter().map(|c| c.to_char()).collect();
        if prefix.is_empty() {
            return Ok(());
        }
        let Some(completion) = self.completion.unambiguous_match(&prefix) else {
            return Ok(());
        };
        let suffix = &completion[prefix.len()..];
        for ch in suffix.chars() {
            self.editor.put(crate::utf8::Char::from_char(ch))?;
        }
        Ok(())
    }

    /// Loops reading and applying keystrokes, rendering after every
    /// change, until Enter, Ctrl-C, or a fatal error.
    pub fn readline(&mut self, prompt: &str, out: &mut [u8]) -> Result<ReadCode> {
        self.editor.set_capacity(out.len());
        let mut prev_wrap_rows = self.render_now(prompt, 0)?;
        loop {
            match self.step(out)? {
                StepResult::Enter(_) => return Ok(ReadCode::PressedEnter),
                StepResult::Interrupt(_) => return Ok(ReadCode::PressedInterrupt),
                StepResult::Continue { .. } => {
                    prev_wrap_rows = self.render_now(prompt, prev_wrap_rows)?;
                }
            }
        }
    }

    /// Applies exactly one keystroke. Printable characters are inserted
    /// and report `Success`; Enter/Interrupt report their own codes;
    /// everything else reports `PressedControlSequence` and records the
    /// event for [`RawLine::last_control`].
    pub fn getc(&mut self, prompt: &str, out: &mut [u8]) -> Result<ReadCode> {
        self.editor.set_capacity(out.len());
        let prev_wrap_rows = self.render_now(prompt, 0)?;
        let result = self.step(out)?;
        match result {
            StepResult::Enter(_) => Ok(ReadCode::PressedEnter),
            StepResult::Interrupt(_) => Ok(ReadCode::PressedInterrupt),
            StepResult::Continue { was_char: true } => {
                self.render_now(prompt, prev_wrap_rows)?;
                Ok(ReadCode::Success)
            }
            StepResult::Continue { was_char: false } => {
                self.render_now(prompt, prev_wrap_rows)?;
                Ok(ReadCode::PressedControlSequence)
            }
        }
    }

    /// The most recent non-character keystroke event observed by
    /// [`RawLine::getc`] or [`RawLine::readline`].
    pub fn last_control(&self) -> Option<KeyEvent> {
        self.last_control
    }

    /// Preloads the editor with `text` ahead of the next render.
    pub fn setline(&mut self, text: &str) -> Result<()> {
        self.editor.setline(text)
    }

    /// Character count of a null-terminated UTF-8 buffer.
    pub fn utf8_strlen(bytes: &[u8]) -> usize {
        utf8::strlen(bytes)
    }

    pub fn completion_add(&mut self, parent: Option<NodeHandle>, label: &str) -> NodeHandle {
        self.completion.add(parent, label)
    }

    pub fn completion_lookup(&self, prefix: &str) -> Vec<&str> {
        self.completion.lookup(prefix)
    }

    pub fn history_load(&mut self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        self.history.load(path)
    }

    pub fn history_dump(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        self.history.dump(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A canned terminal: bytes to deliver on read, and every write
    /// collected for inspection.
    struct FakeTerminal {
        input: std::vec::IntoIter<u8>,
        writes: Rc<RefCell<Vec<u8>>>,
    }

    impl FakeTerminal {
        fn new(input: &[u8]) -> (Self, Rc<RefCell<Vec<u8>>>) {
            let writes = Rc::new(RefCell::new(Vec::new()));
            (
                FakeTerminal {
                    input: input.to_vec().into_iter(),
                    writes: writes.clone(),
                },
                writes,
            )
        }
    }

    impl RawTerminal for FakeTerminal {
        fn read_byte(&mut self) -> Result<u8> {
            self.input.next().ok_or(crate::error::Error::Io(
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no more input"),
            ))
        }

        fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
            self.writes.borrow_mut().extend_from_slice(bytes);
            Ok(())
        }

        fn columns(&self) -> Option<usize> {
            Some(80)
        }
    }

    #[test]
    fn readline_types_a_word_and_accepts_on_enter() {
        let (term, _writes) = FakeTerminal::new(b"hi\r");
        let mut rl = RawLine::with_terminal(term, Config::default());
        let mut buf = [0u8; 64];
        let code = rl.readline("$ ", &mut buf).unwrap();
        assert_eq!(code, ReadCode::PressedEnter);
        assert_eq!(&buf[..2], b"hi");
    }

    #[test]
    fn readline_handles_backspace() {
        let (term, _writes) = FakeTerminal::new(&[b'h', b'i', 127, b'!', b'\r']);
        let mut rl = RawLine::with_terminal(term, Config::default());
        let mut buf = [0u8; 64];
        let code = rl.readline("$ ", &mut buf).unwrap();
        assert_eq!(code, ReadCode::PressedEnter);
        assert_eq!(&buf[..2], b"h!");
    }

    #[test]
    fn getc_reports_success_for_a_character_and_control_sequence_for_an_arrow() {
        let mut input = Vec::new();
        input.push(b'a');
        input.extend_from_slice(b"\x1b[C"); // right arrow
        let (term, _writes) = FakeTerminal::new(&input);
        let mut rl = RawLine::with_terminal(term, Config::default());
        let mut buf = [0u8; 64];

        let code = rl.getc("$ ", &mut buf).unwrap();
        assert_eq!(code, ReadCode::Success);

        let code = rl.getc("$ ", &mut buf).unwrap();
        assert_eq!(code, ReadCode::PressedControlSequence);
        assert_eq!(rl.last_control().unwrap().key, Key::Right);
    }

    #[test]
    fn ctrl_c_reports_interrupt() {
        let (term, _writes) = FakeTerminal::new(&[3]);
        let mut rl = RawLine::with_terminal(term, Config::default());
        let mut buf = [0u8; 64];
        let code = rl.readline("$ ", &mut buf).unwrap();
        assert_eq!(code, ReadCode::PressedInterrupt);
    }

    #[test]
    fn tab_completes_an_unambiguous_word() {
        let (term, _writes) = FakeTerminal::new(b"he\t\r");
        let mut rl = RawLine::with_terminal(term, Config::default());
        rl.completion_add(None, "help");
        let mut buf = [0u8; 64];
        let code = rl.readline("$ ", &mut buf).unwrap();
        assert_eq!(code, ReadCode::PressedEnter);
        assert_eq!(&buf[..4], b"help");
    }
}
