//! Jira API client implementation.
//!
//! This module provides the client used by the indicator to count the issues
//! assigned to the configured user. Each fetch is a single stateless
//! request/response cycle: no retries, no pagination, no caching.

use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use tracing::{debug, error, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{IssueSearchResult, SearchResponse};
use crate::config::Credentials;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the issue search endpoint.
pub const SEARCH_PATH: &str = "/rest/api/3/search";

/// Maximum number of issues requested per sync.
pub const MAX_RESULTS: u32 = 10;

/// Pre-encoded JQL: issues assigned to the caller, most recently updated first.
const ASSIGNED_TO_ME_JQL: &str = "assignee=currentuser()%20ORDER%20BY%20updated%20DESC";

/// The Jira API client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// The base URL for the Jira instance, without trailing slashes.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
}

impl JiraClient {
    /// Create a client from stored credentials with the default timeout.
    ///
    /// Does not validate the connection.
    pub fn with_credentials(creds: &Credentials) -> Result<Self> {
        Self::with_timeout(creds, DEFAULT_TIMEOUT)
    }

    /// Create a client from stored credentials with an explicit request timeout.
    pub fn with_timeout(creds: &Credentials, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Self::build_http_client(timeout)?,
            base_url: normalize_base_url(&creds.base_url),
            auth: Auth::from_credentials(creds),
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zentasks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)
    }

    /// Count the issues assigned to the user behind `creds`.
    ///
    /// Returns `Unconfigured` without touching the network when any
    /// credential field is blank.
    pub async fn fetch_assigned_issue_count(creds: &Credentials) -> IssueSearchResult {
        Self::fetch_assigned_issue_count_with_timeout(creds, DEFAULT_TIMEOUT).await
    }

    /// Same as [`JiraClient::fetch_assigned_issue_count`] with an explicit timeout.
    #[instrument(skip(creds), fields(email = %creds.email))]
    pub async fn fetch_assigned_issue_count_with_timeout(
        creds: &Credentials,
        timeout: Duration,
    ) -> IssueSearchResult {
        if let Some(field) = creds.missing_field() {
            info!("Skipping issue fetch: {} is not configured", field);
            return IssueSearchResult::Unconfigured;
        }

        let client = match Self::with_timeout(creds, timeout) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build HTTP client: {}", e);
                return IssueSearchResult::Failure(e);
            }
        };

        client.assigned_issue_count().await
    }

    /// Count the issues assigned to the authenticated user.
    pub async fn assigned_issue_count(&self) -> IssueSearchResult {
        let result: IssueSearchResult = self.search_assigned_issues().await.into();
        match &result {
            IssueSearchResult::Success { count } => info!("Fetched {} assigned issues", count),
            IssueSearchResult::Failure(e) => warn!("Issue fetch failed: {}", e),
            IssueSearchResult::Unconfigured => {}
        }
        result
    }

    /// Search for the issues assigned to the authenticated user.
    ///
    /// Calls `GET /rest/api/3/search` with a fixed JQL query capped at
    /// [`MAX_RESULTS`] issues.
    #[instrument(skip(self))]
    pub async fn search_assigned_issues(&self) -> Result<SearchResponse> {
        let url = self.search_url();
        let response: SearchResponse = self.get(&url).await?;
        debug!("Search returned {} issues", response.issue_count());
        Ok(response)
    }

    /// The full URL of the assigned-issues search.
    pub fn search_url(&self) -> String {
        format!(
            "{}{}?jql={}&maxResults={}",
            self.base_url, SEARCH_PATH, ASSIGNED_TO_ME_JQL, MAX_RESULTS
        )
    }

    /// Perform a single authenticated GET request.
    #[instrument(skip(self), fields(url = %url))]
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle the HTTP response, checking for errors and parsing JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();

        if status.is_success() {
            let body = response.text().await?;
            parse_object::<T>(&body)
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);

            Err(Self::error_from_response(status, &url, &error_body))
        }
    }

    /// Create an appropriate error from an HTTP response.
    fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
        // Jira reports failures as {"errorMessages": [...], "errors": {...}}
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(arr) = json.get("errorMessages").and_then(|m| m.as_array()) {
                let messages: Vec<&str> = arr.iter().filter_map(|v| v.as_str()).collect();
                if !messages.is_empty() {
                    return ApiError::from_status(status, &messages.join(", "));
                }
            }
            if let Some(obj) = json.get("errors").and_then(|e| e.as_object()) {
                let error_strings: Vec<String> =
                    obj.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                if !error_strings.is_empty() {
                    return ApiError::from_status(status, &error_strings.join(", "));
                }
            }
        }

        ApiError::from_status(status, url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Parse `body` as a JSON object, then as `T`.
///
/// Derived struct impls also accept JSON arrays; every Jira response we read
/// is an object, so anything else is rejected up front.
fn parse_object<T: serde::de::DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)?;
    serde_json::from_value(serde_json::Value::Object(object))
}

/// Normalize the base URL by trimming whitespace and trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. The API token is sent in the clear.", url);
    }

    url.to_string()
}
