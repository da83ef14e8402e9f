use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for version-bumper operations
#[derive(Error, Debug)]
pub enum VersionBumperError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("There's no file to keep the version information in component '{component}'")]
    MissingVersionFile { component: String },

    #[error("No version element found in '{}'", path.display())]
    VersionElementNotFound { path: PathBuf },
}

/// Convenience type alias for Results in version-bumper
pub type Result<T> = std::result::Result<T, VersionBumperError>;

impl VersionBumperError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersionBumperError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        VersionBumperError::Version(msg.into())
    }

    /// Create a parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        VersionBumperError::Parse(msg.into())
    }
}
