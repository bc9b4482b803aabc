use async_trait::async_trait;
use log::*;
use std::sync::Arc;

use crate::{
    forge::{traits::Forge, types::GithubRepo},
    inventory::GitHubInventory,
    version::{PackagingVersion, SemanticVersion, latest_of},
};

/// Picks the newest tag of a GitHub repository through a [`Forge`].
pub struct GitHubTagInventory {
    forge: Arc<dyn Forge>,
}

impl GitHubTagInventory {
    pub fn new(forge: Arc<dyn Forge>) -> Self {
        Self { forge }
    }
}

#[async_trait]
impl GitHubInventory for GitHubTagInventory {
    async fn inventory(
        &self,
        owner: &str,
        repo: &str,
        semantic: bool,
    ) -> Option<String> {
        let github_repo = GithubRepo::new(owner, repo);
        debug!("inventorying tags of {github_repo}");

        let tags = match self.forge.list_tags(&github_repo).await {
            Ok(tags) => tags,
            Err(err) => {
                warn!("unable to list tags for {github_repo}: {err}");
                return None;
            }
        };

        let names = tags.iter().map(String::as_str);

        let latest = if semantic {
            latest_of::<SemanticVersion, _>(names)
        } else {
            latest_of::<PackagingVersion, _>(names)
        };

        if latest.is_none() {
            warn!("no usable tags found for {github_repo}");
        }

        latest
    }
}
