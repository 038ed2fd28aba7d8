use std::path::PathBuf;

use thiserror::Error;

/// Failures of session-level storage: directory setup and metadata persistence.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a single image reference did not become a stored image.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image too small: {width}x{height}")]
    TooSmall { width: u32, height: u32 },
}
