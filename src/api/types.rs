//! Jira API response types.

use serde::Deserialize;

use super::error::ApiError;

/// Body of a `GET /rest/api/3/search` response.
///
/// Only the issue collection is read; issue contents are not parsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// The returned issues. Missing or `null` counts as empty.
    #[serde(default)]
    pub issues: Option<Vec<serde::de::IgnoredAny>>,
}

impl SearchResponse {
    /// Number of issues in this page of results.
    pub fn issue_count(&self) -> usize {
        self.issues.as_ref().map_or(0, Vec::len)
    }
}

/// Outcome of one assigned-issue fetch.
#[derive(Debug)]
pub enum IssueSearchResult {
    /// The search succeeded and returned `count` issues.
    Success {
        /// Number of issues returned (at most the page cap).
        count: usize,
    },
    /// The credentials were incomplete, so no request was sent.
    Unconfigured,
    /// The request failed or the response was unusable.
    Failure(ApiError),
}

impl IssueSearchResult {
    /// Whether this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, IssueSearchResult::Success { .. })
    }

    /// The issue count, if the fetch succeeded.
    pub fn count(&self) -> Option<usize> {
        match self {
            IssueSearchResult::Success { count } => Some(*count),
            _ => None,
        }
    }

    /// The failure reason, if the fetch failed.
    pub fn reason(&self) -> Option<String> {
        match self {
            IssueSearchResult::Failure(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// The underlying error, if the fetch failed.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            IssueSearchResult::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<super::error::Result<SearchResponse>> for IssueSearchResult {
    fn from(result: super::error::Result<SearchResponse>) -> Self {
        match result {
            Ok(response) => IssueSearchResult::Success {
                count: response.issue_count(),
            },
            Err(e) => IssueSearchResult::Failure(e),
        }
    }
}
