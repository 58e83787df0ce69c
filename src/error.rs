use alloc::string::String;
use enough::StopReason;

use crate::iff::chunk::ChunkTag;

/// Errors from IFF decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IffError {
    #[error("read of {len} bytes at offset {offset} is out of bounds (buffer is {available} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("truncated data: {0}")]
    TruncatedData(String),

    #[error("corrupt run: packet of {packet} bytes exceeds remaining quota of {remaining}")]
    CorruptRun { packet: usize, remaining: usize },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("not an IFF image (missing FOR4/CIMG root)")]
    UnrecognizedFormat,

    #[error("unexpected chunk {0}")]
    UnexpectedChunk(ChunkTag),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("pixel layout mismatch: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        expected: crate::PixelLayout,
        actual: crate::PixelLayout,
    },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for IffError {
    fn from(r: StopReason) -> Self {
        IffError::Cancelled(r)
    }
}
