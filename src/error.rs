//! Error types for the analysis pipeline and its adapters.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: any of these aborts a run and nothing is persisted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Could not derive cache key from {0:?}")]
    CacheKey(PathBuf),

    #[error("Could not extract audio from {path:?}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("Transcription failed: {0}")]
    Transcription(#[source] CapabilityError),

    #[error("Could not open video {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure of one external capability invocation (detector, OCR, transcriber...).
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("Capability `{0}` is not available")]
    Unavailable(String),

    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Unexpected output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to persist an artifact. Recovered by the pipeline (logged only).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not move entry into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Failure while reading a frame from an open video source.
#[derive(Debug, Error)]
#[error("Decode error at frame {index}: {reason}")]
pub struct FrameReadError {
    pub index: u64,
    pub reason: String,
}
