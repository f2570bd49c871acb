//! Core error types for fitpact-core.
//!
//! This module defines the error hierarchy using thiserror. The taxonomy
//! mirrors how errors surface to callers: validation failures are rejected
//! before any mutation, conflicts signal a caller retry (duplicate username),
//! and storage failures carry the underlying rusqlite error.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fitpact-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Conflicts with existing records
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// A referenced record does not exist
    #[error("No {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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
}

/// Validation errors.
///
/// All of these are rejected synchronously, before any write happens.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field was empty
    #[error("'{0}' must not be empty")]
    EmptyField(&'static str),

    /// A monetary or duration value was out of range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },

    /// Action restricted to the coach
    #[error("This action requires coach privileges")]
    CoachRequired,

    /// Action requires a logged-in user
    #[error("No user is logged in")]
    NotLoggedIn,
}

/// Conflict errors: the write would collide with an existing record.
#[derive(Error, Debug)]
pub enum ConflictError {
    /// Username already taken (case-insensitive)
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// The group already has a coach
    #[error("A coach already exists for this group")]
    CoachExists,
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
        CoreError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
