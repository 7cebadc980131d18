use thiserror::Error;

/// Errors produced while decoding a bencoded buffer. `pos` is the byte offset
/// the decoder was at when it gave up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("incomplete number of bytes at {pos}")]
    BytesEmpty { pos: usize },

    #[error("invalid byte found at {pos}")]
    InvalidByte { pos: usize },

    #[error("integer with no delimiter at {pos}")]
    InvalidIntNoDelimiter { pos: usize },

    #[error("integer encoded as negative zero at {pos}")]
    InvalidIntNegativeZero { pos: usize },

    #[error("integer with zero padding at {pos}")]
    InvalidIntZeroPadding { pos: usize },

    #[error("integer failed to parse at {pos}")]
    InvalidIntParse { pos: usize },

    #[error("negative byte length at {pos}")]
    InvalidLengthNegative { pos: usize },

    #[error("byte length overflows the buffer at {pos}")]
    InvalidLengthOverflow { pos: usize },

    #[error("recursion limit {max} exceeded at {pos}")]
    InvalidRecursionExceeded { pos: usize, max: usize },

    #[error("trailing bytes after the top-level value at {pos}")]
    TrailingBytes { pos: usize },
}
