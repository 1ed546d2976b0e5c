//! Error types for the post-processor crate.
//!
//! Structured error types for the parsing pipeline, recipe serialization,
//! and the filament profile database.

use std::io;
use thiserror::Error;

/// Errors that can occur during post-processing operations.
#[derive(Error, Debug)]
pub enum PostProcessError {
    /// The G-code could not be parsed into usable segments.
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// Invalid parameters were provided to the pipeline.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The requested filament profile does not exist.
    #[error("Unknown filament profile: {0}")]
    UnknownProfile(String),

    /// Two materials cannot be spliced together.
    #[error("Incompatible materials: {0} and {1}")]
    IncompatibleMaterials(String, String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for post-processor operations.
pub type PostProcessResult<T> = Result<T, PostProcessError>;
