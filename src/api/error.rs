//! API error types for the Jira client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when querying the Jira API.
///
/// Every variant produced from an HTTP status carries the numeric code in
/// its display string.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - invalid email or API token.
    #[error("HTTP 401: authentication failed, check your email and API token")]
    Unauthorized,

    /// Permission denied - user lacks access to the resource.
    #[error("HTTP 403: permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("HTTP 404: not found: {0}")]
    NotFound(String),

    /// Rate limited by the Jira API.
    #[error("HTTP 429: rate limited, please wait before syncing again")]
    RateLimited,

    /// Any other non-success status.
    #[error("HTTP {}: {context}", .status.as_u16())]
    Http {
        /// The response status.
        status: StatusCode,
        /// Jira error messages or the request URL.
        context: String,
    },

    /// Network or HTTP transport error (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered 2xx but the body broke the expected contract.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The background fetch stopped before producing a result.
    #[error("Sync task failed: {0}")]
    Interrupted(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(context.to_string()),
            404 => ApiError::NotFound(context.to_string()),
            429 => ApiError::RateLimited,
            _ => ApiError::Http {
                status,
                context: context.to_string(),
            },
        }
    }

    /// The HTTP status code behind this error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited => Some(429),
            ApiError::Http { status, .. } => Some(status.as_u16()),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) | ApiError::Interrupted(_) => None,
        }
    }

    /// Whether the server was unreachable or refused the request.
    pub fn is_transport(&self) -> bool {
        !self.is_response_format()
    }

    /// Whether the server answered successfully with a body we could not use.
    pub fn is_response_format(&self) -> bool {
        matches!(self, ApiError::InvalidResponse(_))
    }
}
