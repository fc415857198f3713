//! Turns raw input bytes into a platform-neutral [`KeyEvent`].
//!
//! This is a small pushdown automaton over the incoming byte stream: most
//! bytes decide the event on the spot, but `ESC` (POSIX) and `224`
//! (Windows) introduce a short, self-delimiting follow-on sequence that has
//! to be read one byte at a time from the same source the rest of the
//! editor reads from.

use crate::error::Result;
use crate::key::{decode_modifier_digit, Key, KeyEvent, Modifiers};

/// Something that can hand back one more input byte, blocking if
/// necessary. Implemented by the raw-mode terminal backends in
/// [`crate::term`]; kept as a closure-friendly trait so tests can feed a
/// canned byte sequence without standing up a real terminal.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<u8>;
}

impl<F: FnMut() -> Result<u8>> ByteSource for F {
    fn read_byte(&mut self) -> Result<u8> {
        (self)()
    }
}

/// Parses one keystroke event starting from `first_byte`, reading any
/// required follow-on bytes from `source`.
pub fn parse_event(first_byte: u8, source: &mut impl ByteSource) -> Result<KeyEvent> {
    match first_byte {
        3 => return Ok(KeyEvent::new(Key::Interrupt)),
        9 => return Ok(KeyEvent::new(Key::Tab)),
        10 | 13 => return Ok(KeyEvent::new(Key::Enter)),
        23 => return Ok(KeyEvent::with_mods(Key::Backspace, Modifiers::CTRL)),
        8 | 127 => return Ok(KeyEvent::new(Key::Backspace)),
        _ => {}
    }

    if first_byte == 27 {
        return parse_posix_escape(source);
    }

    if first_byte == 224 {
        return parse_windows_escape(source);
    }

    if (first_byte as char).is_ascii_control() {
        Ok(KeyEvent::new(Key::Unknown))
    } else {
        // Printable ASCII, or the leading byte of a multi-byte UTF-8
        // codepoint; either way the caller decodes the actual character
        // via `crate::utf8::parse`.
        Ok(KeyEvent::new(Key::Char))
    }
}

/// `CSI`/`SS3` escape sequences as produced by xterm-family terminals.
///
/// Follows the three-step shape the design calls for: read the
/// introducer byte (`[` or `O`), optionally read a `1;<mod>` modifier
/// prefix, then read the final byte that names the key.
fn parse_posix_escape(source: &mut impl ByteSource) -> Result<KeyEvent> {
    let introducer = source.read_byte()?;
    if introducer != b'[' && introducer != b'O' {
        // A bare ESC followed by some other byte is an Alt-prefixed key;
        // the caller still owns decoding that byte as a character.
        return Ok(KeyEvent::with_mods(Key::Char, Modifiers::ALT));
    }

    let mut byte = source.read_byte()?;
    let mut modifiers = Modifiers::empty();
    let mut modifier_already_read = false;

    if byte == b'1' {
        if source.read_byte()? != b';' {
            return Ok(KeyEvent::new(Key::Unknown));
        }
        modifiers |= decode_modifier_digit(source.read_byte()?);
        modifier_already_read = true;
        byte = source.read_byte()?;
    }

    let key = match byte {
        b'3' => Key::Delete,
        b'A' => return Ok(KeyEvent::with_mods(Key::Up, modifiers)),
        b'B' => return Ok(KeyEvent::with_mods(Key::Down, modifiers)),
        b'C' => return Ok(KeyEvent::with_mods(Key::Right, modifiers)),
        b'D' => return Ok(KeyEvent::with_mods(Key::Left, modifiers)),
        b'F' => return Ok(KeyEvent::with_mods(Key::End, modifiers)),
        b'H' => return Ok(KeyEvent::with_mods(Key::Home, modifiers)),
        _ => return Ok(KeyEvent::new(Key::Unknown)),
    };

    // Only `Delete` (`3`) reaches here, and only needs a trailing `~` (or
    // `;<mod>~`) consumed when no modifier introducer was already read.
    if modifier_already_read {
        return Ok(KeyEvent::with_mods(key, modifiers));
    }

    let mut byte = source.read_byte()?;
    if byte == b';' {
        modifiers |= decode_modifier_digit(source.read_byte()?);
        byte = source.read_byte()?;
    }
    if byte != b'~' {
        return Ok(KeyEvent::new(Key::Unknown));
    }
    Ok(KeyEvent::with_mods(key, modifiers))
}

/// Windows console scan-codes, as delivered through the `224`-prefixed
/// extended-key convention this crate's raw-mode backend translates
/// `ReadConsoleInputW` virtual key codes into.
fn parse_windows_escape(source: &mut impl ByteSource) -> Result<KeyEvent> {
    let code = source.read_byte()?;
    let event = match code {
        72 => KeyEvent::new(Key::Up),
        75 => KeyEvent::new(Key::Left),
        77 => KeyEvent::new(Key::Right),
        71 => KeyEvent::new(Key::Home),
        79 => KeyEvent::new(Key::End),
        80 => KeyEvent::new(Key::Down),
        83 => KeyEvent::new(Key::Delete),
        115 => KeyEvent::with_mods(Key::Left, Modifiers::CTRL),
        116 => KeyEvent::with_mods(Key::Right, Modifiers::CTRL),
        147 => KeyEvent::with_mods(Key::Delete, Modifiers::CTRL),
        _ => KeyEvent::new(Key::Unknown),
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(bytes: &'static [u8]) -> impl FnMut() -> Result<u8> {
        let mut iter = bytes.iter().copied();
        move || Ok(iter.next().expect("test fed too few bytes"))
    }

    fn parse(first: u8, rest: &'static [u8]) -> KeyEvent {
        let mut src = feed(rest);
        parse_event(first, &mut src).unwrap()
    }

    #[test]
    fn single_byte_fast_path() {
        assert_eq!(parse(3, &[]).key, Key::Interrupt);
        assert_eq!(parse(9, &[]).key, Key::Tab);
        assert_eq!(parse(10, &[]).key, Key::Enter);
        assert_eq!(parse(13, &[]).key, Key::Enter);
        assert_eq!(parse(127, &[]).key, Key::Backspace);
        assert_eq!(parse(8, &[]).key, Key::Backspace);
        let ctrl_bksp = parse(23, &[]);
        assert_eq!(ctrl_bksp.key, Key::Backspace);
        assert!(ctrl_bksp.ctrl());
    }

    #[test]
    fn arrow_keys() {
        assert_eq!(parse(27, b"[A").key, Key::Up);
        assert_eq!(parse(27, b"[B").key, Key::Down);
        assert_eq!(parse(27, b"[C").key, Key::Right);
        assert_eq!(parse(27, b"[D").key, Key::Left);
        assert_eq!(parse(27, b"[F").key, Key::End);
        assert_eq!(parse(27, b"[H").key, Key::Home);
    }

    #[test]
    fn ctrl_arrow_via_modifier_introducer() {
        let ev = parse(27, b"[1;5C");
        assert_eq!(ev.key, Key::Right);
        assert!(ev.ctrl());

        let ev = parse(27, b"[1;2D");
        assert_eq!(ev.key, Key::Left);
        assert!(ev.shift());
    }

    #[test]
    fn delete_with_and_without_modifier() {
        let ev = parse(27, b"[3~");
        assert_eq!(ev.key, Key::Delete);
        assert!(ev.modifiers.is_empty());

        let ev = parse(27, b"[3;5~");
        assert_eq!(ev.key, Key::Delete);
        assert!(ev.ctrl());
    }

    #[test]
    fn bare_alt_prefixed_char() {
        let ev = parse(27, b"q");
        assert!(ev.alt());
    }

    #[test]
    fn windows_scan_codes() {
        assert_eq!(parse(224, &[72]).key, Key::Up);
        assert_eq!(parse(224, &[75]).key, Key::Left);
        assert_eq!(parse(224, &[77]).key, Key::Right);
        let ev = parse(224, &[115]);
        assert_eq!(ev.key, Key::Left);
        assert!(ev.ctrl());
    }
}
