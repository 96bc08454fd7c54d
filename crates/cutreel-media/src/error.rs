//! Error types for cutreel-media.

use std::io;
use thiserror::Error;

/// Result type for cutreel-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cutreel-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid container structure.
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// Buffer too small for operation.
    #[error("Buffer underflow: need {need} bytes, have {have}")]
    BufferUnderflow { need: usize, have: usize },

    /// A single entry or sub-structure failed to decompress or unpack.
    ///
    /// Callers walking an entry stream are expected to skip the offending
    /// entry and continue; this class is never fatal to a whole movie.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Create an invalid container error.
    pub fn invalid_container(msg: impl Into<String>) -> Self {
        Self::InvalidContainer(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
