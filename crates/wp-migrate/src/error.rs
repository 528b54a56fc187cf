//! Error types for wp-migrate.

use thiserror::Error;

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while migrating WordPress content.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Low-level HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The WordPress API could not be reached or answered with an error.
    #[error("Source connection error: {0}")]
    SourceConnection(String),

    /// A source response could not be decoded.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The destination store rejected a request.
    #[error("Destination error: {0}")]
    Destination(String),

    /// Authentication against an API failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited by an API (retry after N seconds).
    #[error("Rate limited, retry after {0}s")]
    RateLimit(u64),

    /// A record could not be mapped to a destination document.
    #[error("Transform error for record {id}: {reason}")]
    Transform {
        /// Source record id, when known.
        id: String,
        /// What went wrong.
        reason: String,
    },

    /// No transformer is registered for the collection type.
    #[error("Unsupported collection type: {0}")]
    UnsupportedCollection(String),

    /// A spawned task panicked or was cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A bounded task could not be scheduled or lost its result.
    #[error("Task scheduling error: {0}")]
    Scheduling(String),
}

impl Error {
    /// Builds a [`Error::Transform`] for the given record id.
    pub fn transform(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::Transform {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
