//! ZenTasks - Jira credentials and assigned-issue counts for a panel indicator.
//!
//! The library holds everything that does not depend on a particular UI
//! toolkit: the credential file, the Jira search client, background fetch
//! tasks and the indicator logic that drives a host [`shell::Shell`].

pub mod api;
pub mod config;
pub mod error;
pub mod indicator;
pub mod logging;
pub mod shell;
pub mod tasks;

pub use api::{ApiError, IssueSearchResult, JiraClient};
pub use config::{ConfigError, ConfigStore, Credentials};
pub use error::AppError;
pub use indicator::Indicator;
