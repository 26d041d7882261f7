//! Error types for VideoTalker
//!
//! All errors use thiserror for structured error handling.
//! Annotation-data problems never escape the store as errors; these
//! variants cover the persistence layer, settings and the CLI surface.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No video is currently open")]
    NoVideo,

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(String),

    #[error("Sidecar writer is no longer running")]
    WriterClosed,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
