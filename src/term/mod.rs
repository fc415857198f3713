//! Raw-mode terminal access and the one byte-at-a-time read primitive the
//! rest of the crate is built on.
//!
//! The POSIX and Windows backends live in sibling modules and are selected
//! at compile time via `cfg`. Both expose the same [`RawTerminal`] surface,
//! so [`crate::escape::parse_event`] never needs to know which platform it
//! is running on.

#[cfg(unix)]
mod posix;
#[cfg(unix)]
pub use posix::PosixTerminal as PlatformTerminal;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsTerminal as PlatformTerminal;

use crate::error::Result;

/// A raw-mode-scoped handle to the controlling terminal.
///
/// Entering raw mode is acquired on construction and released on `Drop`,
/// mirroring the original's termios save/restore pair so a panic or an
/// early return can never leave the user's shell in raw mode.
pub trait RawTerminal {
    /// Blocks for exactly one more byte of input.
    fn read_byte(&mut self) -> Result<u8>;

    /// Writes `bytes` in a single call, per the renderer's batching
    /// requirement.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Current terminal width in columns, if it can be determined.
    fn columns(&self) -> Option<usize>;
}

/// Enters raw mode on the controlling terminal for the current platform,
/// restoring the prior mode when the returned guard is dropped.
pub fn enter() -> Result<PlatformTerminal> {
    PlatformTerminal::new()
}
