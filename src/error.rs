//! Error types for ThreatLens

use std::time::Duration;
use thiserror::Error;

/// Result type alias for ThreatLens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// The requested entity does not exist. Never cached, never retried.
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    DataStore(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The miss-path fetch did not finish before the configured deadline.
    #[error("Data store fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a not-found error on a named entity.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// Whether this error means the entity is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Failures of the underlying data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(String),

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),

    #[error("Database connection lock poisoned")]
    Poisoned,

    #[error("Database worker failed: {0}")]
    Task(String),

    #[error("Unsupported database schema version {found} (expected {expected})")]
    SchemaVersion { found: i32, expected: i32 },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DataStore(err.into())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid cache budget {0}: must be greater than zero")]
    InvalidCacheBudget(u64),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
