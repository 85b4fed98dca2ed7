//! Client error types.

use thiserror::Error;

/// Message attached to every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "rate limit exceeded, retry later";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a 5xx status (retryable).
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the server, or a generic fallback.
        message: String,
    },

    /// Server answered with 429 (retryable).
    #[error("{message}")]
    RateLimited {
        /// Human-readable message.
        message: String,
    },

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status (fatal).
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the server, or a generic fallback.
        message: String,
    },

    /// A retryable error kept failing until the retry budget ran out.
    #[error("request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Total attempts made, including the first.
        attempts: u32,
        /// The error of the final attempt.
        #[source]
        source: Box<Error>,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create the 429 error.
    pub fn rate_limited() -> Self {
        Self::RateLimited {
            message: RATE_LIMIT_MESSAGE.to_string(),
        }
    }

    /// Returns true if the retry executor should re-issue the request.
    ///
    /// Only server errors and rate limits qualify; everything else,
    /// including exhausted retries, is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::RateLimited { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { status: 401 | 403, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(429),
            Error::NotFound(_) => Some(404),
            Error::RetriesExhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the platform: `{"error": {"type": ..., "message": ...}}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default, rename = "type")]
    #[allow(dead_code)]
    pub kind: Option<String>,
    pub message: String,
}
