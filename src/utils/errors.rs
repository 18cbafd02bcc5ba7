//! Error handling for ExploreWithMe
//!
//! This module defines the main error types used throughout the core
//! and folds them into the caller-facing taxonomy (not found, conflict, validation).

use thiserror::Error;

/// Main error type for the ExploreWithMe core
#[derive(Error, Debug)]
pub enum EwmError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Statistics service error: {0}")]
    Stats(#[from] StatsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Statistics service specific errors
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Statistics request failed: {0}")]
    RequestFailed(String),

    #[error("Statistics service timeout")]
    Timeout,

    #[error("Invalid statistics response: {0}")]
    InvalidResponse(String),

    #[error("Statistics service unavailable")]
    ServiceUnavailable,

    #[error("Statistics client disabled")]
    Disabled,
}

/// Result type alias for ExploreWithMe operations
pub type Result<T> = std::result::Result<T, EwmError>;

/// Result type alias for statistics client operations
pub type StatsResult<T> = std::result::Result<T, StatsError>;

/// Failure categories surfaced to the API layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for check_violation
const CHECK_VIOLATION: &str = "23514";
/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl EwmError {
    pub fn not_found(message: impl Into<String>) -> Self {
        EwmError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        EwmError::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EwmError::Validation(message.into())
    }

    /// Convert a database error into a conflict when it is a constraint violation.
    ///
    /// Unique, check and foreign key violations are rule violations from the
    /// caller's point of view; everything else stays a database error.
    pub fn from_constraint(error: sqlx::Error, message: impl Into<String>) -> Self {
        let is_constraint = error
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| {
                code == UNIQUE_VIOLATION || code == CHECK_VIOLATION || code == FOREIGN_KEY_VIOLATION
            })
            .unwrap_or(false);

        if is_constraint {
            EwmError::Conflict(message.into())
        } else {
            EwmError::Database(error)
        }
    }

    /// Whether a database error is a unique-constraint violation
    pub fn is_unique_violation(error: &sqlx::Error) -> bool {
        error
            .as_database_error()
            .and_then(|db| db.code())
            .map_or(false, |code| code == UNIQUE_VIOLATION)
    }

    /// Caller-facing failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            EwmError::NotFound(_) => ErrorKind::NotFound,
            EwmError::Conflict(_) => ErrorKind::Conflict,
            EwmError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Internal,
        }
    }
}
