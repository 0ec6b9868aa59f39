//! Core error types for wayfarer-core.
//!
//! Failure taxonomy: validation problems abort the operation and are
//! surfaced to the caller once; platform permission denials are logged and
//! swallowed (reminder delivery is best-effort); lockout is a PinGate state,
//! not an error. Nothing is retried transparently.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wayfarer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Validation errors -- bad input, operation aborted, no partial write
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    /// PIN gate errors
    #[error("PIN error: {0}")]
    Pin(#[from] PinError),

    /// OS secret store (keyring) errors
    #[error("Secret store error: {0}")]
    Secret(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors. Surfaced inline to the user; the operation aborts
/// before anything is written.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Activity description is empty after trimming
    #[error("Description must not be empty")]
    DescriptionEmpty,

    /// Activity description exceeds the maximum length
    #[error("Description is {len} characters; the maximum is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    /// Activity falls outside the allowed window around its trip
    #[error(
        "Activity time must fall between 3 days before the trip starts \
         and 3 days after it ends"
    )]
    OutsideTripWindow {
        activity_time: i64,
        window_start: i64,
        window_end: i64,
    },

    /// Trip dates are inverted
    #[error("Trip end date must not precede its start date")]
    InvalidTripDates { start: i64, end: i64 },

    /// A PIN must be exactly four digits
    #[error("PIN must be exactly 4 digits")]
    InvalidPin,
}

/// PIN gate errors.
#[derive(Error, Debug)]
pub enum PinError {
    /// Numeric input is disabled until the gate is reset
    #[error("PIN entry is locked; reset with your account credentials")]
    Locked,

    /// Only the digits 0-9 are accepted
    #[error("'{0}' is not a digit")]
    InvalidDigit(char),

    /// Credential-based reset was refused by the authenticator
    #[error("Usuario o contraseña incorrectos")]
    CredentialsRejected,

    /// No PIN has been set yet
    #[error("No PIN has been set")]
    NoPinSet,
}

/// Platform seam errors (alarm registration, alert presentation).
///
/// These never propagate to the user: callers log them and carry on, so a
/// revoked notification permission can never roll back a data save.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The platform refused the scheduling or display capability
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The backing service is unavailable
    #[error("Platform unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<keyring::Error> for CoreError {
    fn from(err: keyring::Error) -> Self {
        CoreError::Secret(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
