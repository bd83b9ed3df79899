use std::time::Duration;

use thiserror::Error;

use super::sanitize::Rejection;

/// Everything that can go wrong between a submit and a rendered reply.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("invalid message: {0}")]
    Validation(Rejection),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid response format: {0}")]
    Format(String),
}

impl ClientError {
    /// Whether the transport loop should try again after this error.
    ///
    /// Rate limiting and other client-side statuses are not retried; the
    /// relay would answer the same way.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => true,
            ClientError::Server { status, .. } => *status >= 500 || *status == 408,
            ClientError::Validation(_) | ClientError::Format(_) => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::Server { status: 429, .. })
    }
}
