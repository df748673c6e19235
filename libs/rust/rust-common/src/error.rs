//! Centralized error types for storage and infrastructure collaborators.
//!
//! Every backing store used by auth-platform services reports failures as a
//! [`PlatformError`]. Services classify these into their own domain errors
//! at their boundary; a `PlatformError` is never shown to an API caller.

use std::time::Duration;
use thiserror::Error;

/// Result alias for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Common error type for platform operations.
///
/// All errors are classified as either retryable or non-retryable,
/// which helps callers decide whether to retry failed operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing service or store is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Operation did not finish before its deadline
    #[error("Operation {operation} timed out after {after:?}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Deadline that was exceeded
        after: Duration,
    },

    /// A unit of work could not be started or finalized
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O failure while reading local resources
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Check if this error is retryable.
    ///
    /// Retryable errors are transient failures that may succeed on retry.
    /// Services do not retry internally; the classification is surfaced so
    /// the external caller can apply its own policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let err = PlatformError::unavailable("postgres");
    /// assert!(err.is_retryable());
    ///
    /// let err = PlatformError::NotFound("user".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Timeout { .. } | Self::Transaction(_)
        )
    }

    /// Create a timeout error for the named operation.
    #[must_use]
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a transaction error with the given message.
    #[must_use]
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error with the given message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
