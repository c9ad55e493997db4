//! Crate-level error types.
//!
//! [`LedgerError`] covers the three informal failure kinds of the service
//! surface (not-found, bad-request, internal) behind a single enum so
//! callers can match on the variant they care about while still using the
//! `?` operator for easy propagation. All errors are terminal for the
//! operation that produced them; nothing is retried.

use crate::models::Uid;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Top-level error type returned by all public operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The requested user id is unknown (404-equivalent).
    #[error("user {0} not found")]
    UserNotFound(Uid),

    /// A required field was missing or malformed (400-equivalent).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A configuration value could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
