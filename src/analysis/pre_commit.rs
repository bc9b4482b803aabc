use async_trait::async_trait;
use std::{path::Path, sync::Arc};

use crate::{
    analysis::{Analyzer, kustomize::latest_tags},
    error::Result,
    inventory::GitHubInventory,
    scanner::PreCommitScanner,
    update::{PreCommitUpdate, Update, UpdateState},
};

/// Finds pre-commit hooks pinned to an older revision.
pub struct PreCommitAnalyzer {
    inventory: Arc<dyn GitHubInventory>,
}

impl PreCommitAnalyzer {
    pub fn new(inventory: Arc<dyn GitHubInventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Analyzer for PreCommitAnalyzer {
    fn name(&self) -> &'static str {
        PreCommitScanner::NAME
    }

    async fn analyze(&self, root: &Path, _update: bool) -> Result<Vec<Update>> {
        let dependencies = PreCommitScanner.scan(root)?;

        let repositories = dependencies
            .iter()
            .map(|d| (d.owner.as_str(), d.repo.as_str()))
            .collect();
        let latest =
            latest_tags(self.inventory.as_ref(), repositories, false).await;

        let mut results = vec![];

        for dependency in &dependencies {
            let key = (dependency.owner.as_str(), dependency.repo.as_str());
            let Some(latest) = latest.get(&key) else {
                continue;
            };

            if *latest != dependency.version {
                results.push(Update::PreCommit(PreCommitUpdate {
                    repository: dependency.repository.clone(),
                    current: dependency.version.clone(),
                    latest: latest.clone(),
                    path: dependency.path.clone(),
                    state: UpdateState::Pending,
                }));
            }
        }

        Ok(results)
    }
}
