//! Configuration management for ZenTasks.
//!
//! This module handles loading and saving the Jira credentials file that
//! the indicator reads before every sync.

mod credentials;
mod store;

use std::io;

use thiserror::Error;

pub use credentials::Credentials;
pub use store::ConfigStore;

/// Name of the application directory under the user's config directory.
pub const APP_DIR_NAME: &str = "zentasks";

/// File name of the credentials document.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur while validating or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    /// A required credential field is empty.
    #[error("{0} cannot be empty")]
    Incomplete(&'static str),

    /// A credential field is present but malformed.
    #[error("{0}")]
    ValidationError(String),

    /// The configuration directory could not be created.
    #[error("failed to create configuration directory: {0}")]
    CreateDirError(#[source] io::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    ReadError(#[source] io::Error),

    /// The configuration file could not be written.
    #[error("failed to write configuration file: {0}")]
    WriteError(#[source] io::Error),

    /// The configuration file is not valid JSON.
    #[error("failed to parse configuration file: {0}")]
    ParseError(#[source] serde_json::Error),

    /// The credentials could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[source] serde_json::Error),
}

impl ConfigError {
    /// Whether this error came from the storage layer (directory or file write).
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ConfigError::CreateDirError(_) | ConfigError::WriteError(_)
        )
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
