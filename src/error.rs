//! Centralized error types for ZenTasks.
//!
//! Aggregates the configuration and API errors so the host can turn any
//! failure into a short notification.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors (terminal, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable credentials are stored.
    #[error("Jira is not configured")]
    NotConfigured,

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display in a notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find the configuration directory.".to_string()
                }
                ConfigError::Incomplete(field) => format!("The {} is required.", field),
                ConfigError::ValidationError(msg) => msg.clone(),
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save the configuration. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read the configuration file.".to_string()
                }
                ConfigError::ParseError(_) => "The configuration file is invalid.".to_string(),
                ConfigError::SerializeError(_) => {
                    "Could not save the configuration. Internal error.".to_string()
                }
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => {
                    "Jira rejected the credentials (401). Check your email and API token."
                        .to_string()
                }
                ApiError::Forbidden(_) => {
                    "Jira denied access (403) to the issue search.".to_string()
                }
                ApiError::NotFound(_) => {
                    "Jira search endpoint not found (404). Check the Jira URL.".to_string()
                }
                ApiError::RateLimited => {
                    "Too many requests (429). Wait a moment and sync again.".to_string()
                }
                ApiError::Http { status, .. } => {
                    format!("Jira returned HTTP {}.", status.as_u16())
                }
                ApiError::Network(_) => {
                    "Could not reach Jira. Check your connection and Jira URL.".to_string()
                }
                ApiError::InvalidResponse(_) => {
                    "Jira answered with an unexpected response.".to_string()
                }
                ApiError::Interrupted(_) => "The sync stopped unexpectedly.".to_string(),
            },
            AppError::Io(_) => "A terminal operation failed.".to_string(),
            AppError::NotConfigured => "Jira is not configured yet.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::NotConfigured | AppError::Config(ConfigError::Incomplete(_)) => {
                Some("Run 'zentasks configure' to enter your Jira URL, email and API token.")
            }
            AppError::Api(ApiError::Unauthorized) => {
                Some("Check your API token at https://id.atlassian.com/manage-profile/security/api-tokens")
            }
            AppError::Api(ApiError::RateLimited) => Some("Wait a few seconds and sync again."),
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::NotFound(_)) => {
                Some("Check your internet connection and Jira URL.")
            }
            _ => None,
        }
    }

    /// The user message with the suggested action appended, if any.
    pub fn notification_body(&self) -> String {
        match self.suggested_action() {
            Some(action) => format!("{} {}", self.user_message(), action),
            None => self.user_message(),
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::NoConfigDir.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::NoConfigDir)));
    }

    #[test]
    fn test_app_error_from_api_error() {
        let app_err: AppError = ApiError::Unauthorized.into();
        assert!(matches!(app_err, AppError::Api(ApiError::Unauthorized)));
    }

    #[test]
    fn test_user_message_unauthorized_mentions_status() {
        let msg = AppError::Api(ApiError::Unauthorized).user_message();
        assert!(msg.contains("401"));
        assert!(msg.contains("API token"));
    }

    #[test]
    fn test_user_message_http_status() {
        let err = AppError::Api(ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "x"));
        assert_eq!(err.user_message(), "Jira returned HTTP 503.");
    }

    #[test]
    fn test_user_message_incomplete_names_field() {
        let err = AppError::Config(ConfigError::Incomplete("email"));
        assert_eq!(err.user_message(), "The email is required.");
    }

    #[test]
    fn test_not_configured_suggests_configure() {
        let err = AppError::NotConfigured;
        assert!(err.suggested_action().unwrap().contains("zentasks configure"));
        assert!(err.notification_body().starts_with("Jira is not configured yet."));
    }

    #[test]
    fn test_notification_body_without_action() {
        let err = AppError::Api(ApiError::InvalidResponse("bad".to_string()));
        assert_eq!(
            err.notification_body(),
            "Jira answered with an unexpected response."
        );
    }

    #[test]
    fn test_other_error() {
        let err = AppError::other("something went wrong");
        assert_eq!(err.user_message(), "something went wrong");
    }
}
