//! Error types for evquery

use thiserror::Error;

/// Result type alias using EvQueryError
pub type Result<T> = std::result::Result<T, EvQueryError>;

/// Error type alias for convenience
pub type Error = EvQueryError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const CONVERSION_FAILED: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for evquery
#[derive(Debug, Error)]
pub enum EvQueryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No API key configured. Callers route to the local optimizer instead.
    #[error("Model unavailable: no API key configured")]
    ModelUnavailable,

    #[error("Model request failed: {0}")]
    ModelRequestFailed(String),

    #[error("Could not extract a query from the model response")]
    UnparsableResponse { raw: String },

    #[error("Local optimizer failed: {0}")]
    LocalOptimizerFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl EvQueryError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LocalOptimizerFailed(_) => exit_codes::CONVERSION_FAILED,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether this error ends a conversion outright instead of triggering fallback
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LocalOptimizerFailed(_))
    }
}
