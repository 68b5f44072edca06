//! Error types that can be emitted from this library.

use std::io;

use thiserror::Error as ThisError;

/// Generic result type with [`Error`] as its error variant.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while scanning or extracting ZIP members.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// The source is not a valid ZIP container: bad leading signature,
    /// unexpected record, or structure truncated mid-record.
    #[error("invalid ZIP archive: {0}")]
    Format(String),

    /// A requested member name was not present in the archive.
    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),

    /// A member's payload could not be decoded: corrupt compressed data,
    /// payload shorter than declared, or CRC-32 mismatch.
    #[error("corrupt data for entry {name}: {reason}")]
    Decode {
        /// Stored name of the affected member.
        name: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The archive is well-formed but uses a feature outside the supported
    /// subset (encryption, data descriptors, unknown compression methods).
    #[error("unsupported ZIP feature: {0}")]
    Unsupported(String),

    /// I/O failure while reading from the underlying source.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Lets entry content streams implement [`std::io::Read`] without losing
/// the typed kind; the original error stays recoverable through
/// [`io::Error::downcast`].
impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            other => io::Error::other(other),
        }
    }
}
