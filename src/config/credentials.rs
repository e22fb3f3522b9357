//! Jira credentials as stored in the config file.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// The Jira connection details used for Basic authentication.
///
/// Missing keys deserialize as empty strings, so a partially written file
/// still loads and is reported as incomplete rather than corrupt.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Credentials {
    /// The Jira instance URL (e.g., "https://company.atlassian.net").
    #[serde(rename = "jira_base_url")]
    pub base_url: String,

    /// The account email address.
    #[serde(rename = "jira_email")]
    pub email: String,

    /// The Jira API token.
    #[serde(rename = "jira_token")]
    pub api_token: String,
}

impl Credentials {
    /// Create a new set of credentials.
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    /// Whether all three fields hold something other than whitespace.
    ///
    /// A fetch is only attempted for complete credentials.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// The first field that is empty or whitespace-only, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.base_url.trim().is_empty() {
            Some("Jira URL")
        } else if self.email.trim().is_empty() {
            Some("email")
        } else if self.api_token.trim().is_empty() {
            Some("API token")
        } else {
            None
        }
    }

    /// Validate these credentials before they are saved.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Incomplete` when a field is blank and
    /// `ConfigError::ValidationError` when the URL has no http(s) scheme.
    pub fn validate(&self) -> Result<()> {
        if let Some(field) = self.missing_field() {
            return Err(ConfigError::Incomplete(field));
        }

        let url = self.base_url.trim();
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "Jira URL '{}' must start with http:// or https://",
                url
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
