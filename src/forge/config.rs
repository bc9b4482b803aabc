//! Configuration for GitHub API connections.
use secrecy::SecretString;
use std::time::Duration;

/// Public GitHub API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Host used for cloning and pushing.
pub const DEFAULT_GITHUB_HOST: &str = "github.com";
/// Bound on establishing a connection to the API.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound on waiting for an API response.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Tags requested per page when listing repository tags.
pub const TAG_PAGE_SIZE: u8 = 100;

/// Connection configuration for authenticating with GitHub.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API base URL.
    pub api_base: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}
