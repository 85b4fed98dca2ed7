//! Domain error types.

use thiserror::Error;

/// Domain-level errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Remote API error, after retries.
    #[error(transparent)]
    Client(#[from] runbridge_client::Error),

    /// Caller-supplied value rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Webhook payload without a usable run.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

impl DomainError {
    /// Whether this wraps a remote "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::Client(e) if e.is_not_found())
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
