//! Error types for the workout_core library.

use std::io;
use std::time::Duration;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport error talking to the plan generator
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected by caller-side validation
    #[error("{0}")]
    InvalidInput(String),

    /// The external generator answered with something unusable
    #[error("Plan generator error: {0}")]
    Generator(String),

    /// The external generator did not answer in time
    #[error("Plan generator timed out after {0:?}")]
    GeneratorTimeout(Duration),

    /// Saved plan store error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
