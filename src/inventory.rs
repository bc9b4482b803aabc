//! Upstream inventories: what the newest release of a chart or repository
//! is right now.

/// On-disk cache decorator for Helm inventories.
pub mod cache;

/// Latest tag of a GitHub repository.
pub mod github;

/// Helm repository index inventory.
pub mod helm;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::collections::BTreeMap;

use crate::error::Result;

pub use cache::CachedHelmInventory;
pub use github::GitHubTagInventory;
pub use helm::{HelmRepositoryInventory, canonicalize_url};

/// Latest version string per chart name.
pub type ChartVersions = BTreeMap<String, String>;

/// Source of chart versions for a Helm repository URL.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HelmInventory: Send + Sync {
    /// Fails when the index cannot be fetched or parsed.
    async fn inventory(&self, url: &str) -> Result<ChartVersions>;
}

/// Source of the latest tag for a GitHub repository.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GitHubInventory: Send + Sync {
    /// `None` when the repository cannot be read or has no usable tags.
    /// With `semantic` only strict semantic versions are considered.
    async fn inventory(
        &self,
        owner: &str,
        repo: &str,
        semantic: bool,
    ) -> Option<String>;
}
