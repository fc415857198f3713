//! Platform-neutral keystroke events.
//!
//! Bytes arriving from the terminal are reduced, by [`crate::escape`], to a
//! single [`Key`] tag plus a [`Modifiers`] bitmask. This is the packed
//! "keystroke event" of the data model: exactly one key tag, zero or more
//! modifiers.

use bitflags::bitflags;

bitflags! {
    /// Zero or more modifier keys held down alongside a [`Key`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const CTRL  = 0b001;
        const SHIFT = 0b010;
        const ALT   = 0b100;
    }
}

/// The key half of a keystroke event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character, or the leading byte of a multi-byte UTF-8
    /// codepoint. The parser only classifies the byte as "a character is
    /// starting here"; the caller decodes the actual codepoint via
    /// [`crate::utf8::parse`] from the same first byte.
    Char,
    Unknown,
    Up,
    Down,
    Right,
    Left,
    End,
    Home,
    Enter,
    Backspace,
    Delete,
    Tab,
    Interrupt,
}

/// A fully decoded keystroke: a [`Key`] plus whatever [`Modifiers`] were
/// held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(key: Key) -> Self {
        KeyEvent {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    pub const fn with_mods(key: Key, modifiers: Modifiers) -> Self {
        KeyEvent { key, modifiers }
    }

    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }
}

/// Canonicalize an xterm modifier digit (as found after a `CSI 1 ;` or a
/// trailing `;<digit>~` introducer) onto the table this crate standardizes
/// on, per the open question about inconsistent Shift/Ctrl handling in
/// earlier parsers: 2=Shift, 3=Alt, 5=Ctrl, 6=Ctrl+Shift.
pub(crate) fn decode_modifier_digit(digit: u8) -> Modifiers {
    match digit {
        b'2' => Modifiers::SHIFT,
        b'3' => Modifiers::ALT,
        b'5' => Modifiers::CTRL,
        b'6' => Modifiers::CTRL | Modifiers::SHIFT,
        _ => Modifiers::empty(),
    }
}
