use std::fmt;

/// Everything that can go wrong inside this crate.
///
/// This is the idiomatic `Result<T, Error>` surface used internally; the
/// numeric `ReadCode` used by [`crate::readline`]/[`crate::getc`] is a thin
/// compatibility projection computed from this type, not the other way
/// around.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A leading or continuation byte did not classify as valid UTF-8.
    #[error("invalid UTF-8 byte sequence")]
    InvalidEncoding,
    /// An edit or movement asked for more characters than exist in the
    /// requested direction.
    #[error("position is out of bounds")]
    OutOfBounds,
    /// The caller's output buffer is too small to hold the line.
    #[error("buffer is too small to hold the line")]
    BufferTooSmall,
    /// A growable buffer could not acquire more memory.
    #[error("allocation failed")]
    Allocation,
    /// A platform I/O call failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Numeric return codes mirroring the compatibility surface described in the
/// external-interfaces section of the design: zero for success, negative
/// sentinels for the three ways a read can end without an error, positive
/// values for the error kinds above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ReadCode {
    Success = 0,
    PressedEnter = -1,
    PressedInterrupt = -2,
    PressedControlSequence = -3,
    GenericError = 1,
    BufferTooSmall = 2,
    AllocationFailed = 3,
}

impl fmt::Display for ReadCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as i32)
    }
}

impl From<Error> for ReadCode {
    fn from(err: Error) -> Self {
        match err {
            Error::BufferTooSmall => ReadCode::BufferTooSmall,
            Error::Allocation => ReadCode::AllocationFailed,
            Error::InvalidEncoding | Error::OutOfBounds | Error::Io(_) => ReadCode::GenericError,
        }
    }
}
