//! Error types for cutreel-engine.

use cutreel_common::ResourceKey;
use thiserror::Error;

/// Result type for cutreel-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cutreel-engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No resource exists at the given key.
    #[error("No movie resource at {0}")]
    NotFound(ResourceKey),

    /// A resource exists but is not a single, plain movie blob.
    #[error("Invalid movie content: {0}")]
    InvalidContent(String),

    /// The container layer rejected the resource bytes.
    #[error(transparent)]
    Media(#[from] cutreel_media::Error),
}

impl Error {
    /// Create an invalid content error.
    pub fn invalid_content(msg: impl Into<String>) -> Self {
        Self::InvalidContent(msg.into())
    }
}
