//! Error types for freshen with typed variants for the failures callers
//! need to match on.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for freshen operations.
#[derive(Error, Debug)]
pub enum FreshenError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Update application errors
    #[error("Cannot find dependency for {name} in {}", .path.display())]
    DependencyNotFound { name: String, path: PathBuf },

    #[error("Working tree at {} contains uncommitted changes", .0.display())]
    UncommittedChanges(PathBuf),

    #[error("{command} failed ({status}): {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    // Upstream inventory errors
    #[error("Upstream {source_name} unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    // Forge/Git errors
    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("Pushing {branch} failed: {message}")]
    PushFailed { branch: String, message: String },

    #[error("Invalid git remote URL: {0}")]
    InvalidRemoteUrl(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Network/API errors
    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("API authentication failed: {0}")]
    AuthenticationError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Parsing errors
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using FreshenError
pub type Result<T> = std::result::Result<T, FreshenError>;

impl FreshenError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn dependency_not_found(name: impl Into<String>, path: &Path) -> Self {
        Self::DependencyNotFound {
            name: name.into(),
            path: path.to_path_buf(),
        }
    }

    pub fn upstream(
        source_name: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::UpstreamUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn push_failed(
        branch: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PushFailed {
            branch: branch.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for FreshenError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<walkdir::Error> for FreshenError {
    fn from(err: walkdir::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Network failures are classified so callers can tell auth and rate limit
// problems apart from plain transport errors.
impl From<reqwest::Error> for FreshenError {
    fn from(err: reqwest::Error) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(401) | Some(403) => Self::AuthenticationError(err.to_string()),
            Some(429) => Self::RateLimitExceeded,
            _ => Self::NetworkError(err.to_string()),
        }
    }
}

impl From<octocrab::Error> for FreshenError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}
