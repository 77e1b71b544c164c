//! Error handling for the OKR tracker
//!
//! This module provides idiomatic Rust error types using thiserror for
//! better error messages and proper error chain handling.

use thiserror::Error;

/// Main error type for OKR operations
#[derive(Error, Debug)]
pub enum OkrError {
    /// The ticket id is unknown to the ticket store.
    #[error("Ticket {0} not found")]
    NotFound(u64),

    /// Malformed input: bad filter combination, out-of-range percentage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The ticket store is unreachable or rejected a write.
    #[error("Ticket store error: {0}")]
    Upstream(String),
}

impl OkrError {
    pub fn validation(message: impl Into<String>) -> Self {
        OkrError::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        OkrError::Upstream(message.into())
    }

    /// True for failures that are safe to swallow on best-effort steps.
    pub fn is_not_found(&self) -> bool {
        matches!(self, OkrError::NotFound(_))
    }
}

impl From<reqwest::Error> for OkrError {
    fn from(error: reqwest::Error) -> Self {
        OkrError::Upstream(error.to_string())
    }
}

/// Result type for OKR operations
pub type OkrResult<T> = Result<T, OkrError>;
