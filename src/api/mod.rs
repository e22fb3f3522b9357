//! Jira API client and types.
//!
//! This module provides the interface for communicating with the Jira REST API.

mod auth;
mod client;
pub mod error;
mod types;

pub use auth::Auth;
pub use client::{JiraClient, DEFAULT_TIMEOUT, MAX_RESULTS, SEARCH_PATH};
pub use error::ApiError;
pub use types::{IssueSearchResult, SearchResponse};
