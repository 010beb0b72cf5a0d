//! Error types shared by generation, mesh I/O and verification.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any geometry work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("malformed config: {0}")]
    Config(#[from] serde_json::Error),

    /// Fewer bytes than the 80-byte header plus the triangle count.
    #[error("invalid STL header: expected 84 bytes, got {got}")]
    InvalidHeader { got: usize },

    #[error("truncated STL: expected {expected} triangles, got {got}")]
    TruncatedMesh { expected: u32, got: u32 },
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}
