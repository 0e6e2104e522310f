//! Library-wide error and result types.

use std::io;

use thiserror::Error;

use crate::text::Codepage;

/// Result alias used throughout datkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every error is final: decoders never attempt partial recovery and the
/// builder never hands out a partially patched buffer.
#[derive(Debug, Error)]
pub enum Error {
    /// A magic/signature field did not match the expected value.
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    /// A `SIR` container with a version character other than `0`.
    #[error("unsupported container version: SIR{}", char::from(*.0))]
    UnsupportedVersion(u8),

    /// A length recorded in a header disagrees with the buffer it describes.
    #[error("declared length {declared} does not match actual length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// A structural constraint was violated (message describes which one).
    #[error("format error: {0}")]
    Format(&'static str),

    /// An Exponential-Golomb prefix ran past the longest legal code.
    #[error("corrupt stream at byte {offset:#x}: prefix of {prefix} zero bits")]
    CorruptStream { offset: usize, prefix: u32 },

    /// A read would extend past the end of the buffer.
    #[error("read of {len} bytes at offset {offset:#x} exceeds buffer of {size} bytes")]
    OutOfBounds { offset: usize, len: usize, size: usize },

    /// A buffer does not have a length the operation accepts.
    #[error("invalid length for {context}: {len}")]
    InvalidLength { context: &'static str, len: usize },

    /// The caller described a container the builder cannot lay out.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Text could not be converted to or from the requested code page.
    #[error("text at offset {offset:#x} is not representable in {codepage}")]
    Encoding { codepage: Codepage, offset: usize },

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
