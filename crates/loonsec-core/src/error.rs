//! Error types for LoonSec

use thiserror::Error;

/// Result type alias using LoonSec Error
pub type Result<T> = std::result::Result<T, Error>;

/// LoonSec error types
#[derive(Error, Debug)]
pub enum Error {
    // === Lookup Errors ===
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("NVD API returned status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Ambiguous lookup for {cve_id}: {count} records returned")]
    AmbiguousResult { cve_id: String, count: usize },

    #[error("Retry budget exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is worth another attempt.
    ///
    /// Lookup retries do not distinguish failure causes: transport errors,
    /// unexpected statuses, and malformed bodies all consume an attempt. Only
    /// a well-formed but ambiguous response is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::UnexpectedStatus { .. } | Error::Json(_) | Error::Parse(_)
        )
    }

    /// Get an error code for logging/metrics
    pub fn code(&self) -> &'static str {
        match self {
            Error::Transport(_) => "TRANSPORT_ERROR",
            Error::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Error::AmbiguousResult { .. } => "AMBIGUOUS_RESULT",
            Error::Exhausted { .. } => "RETRIES_EXHAUSTED",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::Json(_) => "JSON_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}
