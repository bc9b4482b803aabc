//! Configuration loading and parsing for `freshen.toml` files.
//!
//! Every field has a default so a missing or partial file is valid. GitHub
//! credentials can also come from the environment.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::error::{FreshenError, Result};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "freshen.toml";

/// Branch the tool commits to.
pub const DEFAULT_BRANCH: &str = "u/freshen";

/// Token variables, in order of precedence.
const TOKEN_VARS: &[&str] = &["FRESHEN_GITHUB_TOKEN", "GITHUB_TOKEN"];
const USER_VAR: &str = "FRESHEN_GITHUB_USER";
const EMAIL_VAR: &str = "FRESHEN_GITHUB_EMAIL";

/// A GitHub repository to keep up to date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryConfig {
    pub owner: String,
    pub repo: String,
}

/// Root configuration structure for `freshen.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Treat non-exact Helm versions as ranges instead of always updating
    /// them to a pinned version.
    pub allow_expressions: bool,
    /// Cache Helm repository indexes on disk.
    pub cache_enabled: bool,
    /// Directory holding the Helm cache.
    pub cache_path: PathBuf,
    /// Commit email. When unset the token owner's profile is used.
    pub github_email: Option<String>,
    #[serde(deserialize_with = "deserialize_secret")]
    pub github_token: SecretString,
    pub github_user: String,
    pub repositories: Vec<RepositoryConfig>,
    /// Directory for checkouts and the Python virtual environment.
    pub work_area: PathBuf,
    pub branch: String,
    /// Ask GitHub to merge the pull request once checks pass.
    pub auto_merge: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_expressions: false,
            cache_enabled: true,
            cache_path: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("freshen"),
            github_email: None,
            github_token: SecretString::from(String::new()),
            github_user: String::new(),
            repositories: vec![],
            work_area: PathBuf::from("."),
            branch: DEFAULT_BRANCH.to_string(),
            auto_merge: true,
        }
    }
}

fn deserialize_secret<'de, D>(
    deserializer: D,
) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Config {
    /// Loads `path`, or `freshen.toml` in the current directory when no
    /// path is given, then applies environment overrides. Only an
    /// explicitly named file is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|name| env::var(name).ok());

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            FreshenError::invalid_config(format!(
                "unable to read {}: {err}",
                path.display()
            ))
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Overrides GitHub settings with non-empty values from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(token) = TOKEN_VARS.iter().find_map(|v| non_empty(v)) {
            self.github_token = SecretString::from(token);
        }

        if let Some(user) = non_empty(USER_VAR) {
            self.github_user = user;
        }

        if let Some(email) = non_empty(EMAIL_VAR) {
            self.github_email = Some(email);
        }
    }

    /// Fails unless a token and a user are configured, which pushing and
    /// opening pull requests need.
    pub fn require_github_credentials(&self) -> Result<()> {
        if self.github_token.expose_secret().is_empty() {
            return Err(FreshenError::invalid_config(
                "a GitHub token is required (github_token or FRESHEN_GITHUB_TOKEN)",
            ));
        }

        if self.github_user.is_empty() {
            return Err(FreshenError::invalid_config(
                "a GitHub user is required (github_user or FRESHEN_GITHUB_USER)",
            ));
        }

        Ok(())
    }

    /// Location of the shared Python virtual environment.
    pub fn venv_path(&self) -> PathBuf {
        self.work_area.join("venv")
    }
}
