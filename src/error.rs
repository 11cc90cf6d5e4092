use std::fmt;
use std::io;

/// Convenient alias for results produced by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can be produced while encoding, decoding or serializing time lines.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Wrapper around standard I/O errors.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A tag byte with no known handler was read from a sample or time stream.
    #[error("unknown {stream} opcode 0x{tag:02x}")]
    UnknownOpcode {
        /// Which stream the tag was read from (`"sample"` or `"timeline"`).
        stream: &'static str,
        /// The offending tag byte.
        tag: u8,
    },

    /// Fewer bytes were left than the current opcode requires.
    #[error("truncated stream: needed {needed} bytes, {remaining} remaining")]
    TruncatedStream {
        /// Bytes required to finish the current frame.
        needed: usize,
        /// Bytes actually left in the input.
        remaining: usize,
    },

    /// Chunk metadata disagrees with the contents of its byte buffers.
    #[error("inconsistent chunk: {0}")]
    InconsistentChunk(String),

    /// Input was well framed but carries a value the codec rejects.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A Base64 field in a compact view could not be decoded.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    pub(crate) fn invalid<T: fmt::Display>(msg: T) -> Self {
        Self::InvalidData(msg.to_string())
    }

    pub(crate) fn inconsistent<T: fmt::Display>(msg: T) -> Self {
        Self::InconsistentChunk(msg.to_string())
    }

    pub(crate) fn truncated(needed: usize, remaining: usize) -> Self {
        Self::TruncatedStream { needed, remaining }
    }
}
