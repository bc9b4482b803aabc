use async_trait::async_trait;
use futures::future::join_all;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    sync::Arc,
};

use crate::{
    analysis::Analyzer,
    error::Result,
    inventory::GitHubInventory,
    scanner::KustomizeScanner,
    update::{KustomizeUpdate, Update, UpdateState},
};

/// Latest tag per GitHub repository, fetched concurrently. Repositories
/// without a usable tag are left out.
pub(crate) async fn latest_tags<'a>(
    inventory: &dyn GitHubInventory,
    repositories: BTreeSet<(&'a str, &'a str)>,
    semantic: bool,
) -> BTreeMap<(&'a str, &'a str), String> {
    let fetches = repositories.into_iter().map(|(owner, repo)| async move {
        ((owner, repo), inventory.inventory(owner, repo, semantic).await)
    });

    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|(key, latest)| latest.map(|l| (key, l)))
        .collect()
}

/// Finds remote Kustomize resources pinned to an older tag.
pub struct KustomizeAnalyzer {
    inventory: Arc<dyn GitHubInventory>,
}

impl KustomizeAnalyzer {
    pub fn new(inventory: Arc<dyn GitHubInventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Analyzer for KustomizeAnalyzer {
    fn name(&self) -> &'static str {
        KustomizeScanner::NAME
    }

    async fn analyze(&self, root: &Path, _update: bool) -> Result<Vec<Update>> {
        let dependencies = KustomizeScanner.scan(root)?;

        let repositories = dependencies
            .iter()
            .map(|d| (d.owner.as_str(), d.repo.as_str()))
            .collect();
        let latest =
            latest_tags(self.inventory.as_ref(), repositories, true).await;

        let results = dependencies
            .iter()
            .filter_map(|dependency| {
                let key = (dependency.owner.as_str(), dependency.repo.as_str());
                let latest = latest.get(&key)?;

                (*latest != dependency.version).then(|| {
                    Update::Kustomize(KustomizeUpdate {
                        url: dependency.url.clone(),
                        owner: dependency.owner.clone(),
                        repo: dependency.repo.clone(),
                        current: dependency.version.clone(),
                        latest: latest.clone(),
                        path: dependency.path.clone(),
                        state: UpdateState::Pending,
                    })
                })
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MockGitHubInventory;
    use std::fs;
    use tempfile::TempDir;

    const KUSTOMIZATION: &str = r#"resources:
  - github.com/lsst-sqre/sqrbot-jr.git//manifests/base?ref=0.6.0
  - github.com/lsst-sqre/sqrbot-jr.git//manifests/extra?ref=0.6.0
  - github.com/lsst-sqre/current//manifests?ref=1.0.0
  - github.com/lsst-sqre/untagged//manifests?ref=0.1.0
"#;

    #[tokio::test]
    async fn one_lookup_per_repository() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kustomization.yaml");
        fs::write(&path, KUSTOMIZATION).unwrap();

        let mut inventory = MockGitHubInventory::new();
        inventory
            .expect_inventory()
            .withf(|owner, repo, semantic| {
                owner == "lsst-sqre" && repo == "sqrbot-jr" && *semantic
            })
            .times(1)
            .returning(|_, _, _| Some("0.7.0".into()));
        inventory
            .expect_inventory()
            .withf(|_, repo, _| repo == "current")
            .times(1)
            .returning(|_, _, _| Some("1.0.0".into()));
        inventory
            .expect_inventory()
            .withf(|_, repo, _| repo == "untagged")
            .times(1)
            .returning(|_, _, _| None);

        let analyzer = KustomizeAnalyzer::new(Arc::new(inventory));
        let results = analyzer.analyze(tmp.path(), false).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            Update::Kustomize(KustomizeUpdate {
                url: "github.com/lsst-sqre/sqrbot-jr.git//manifests/base?ref=0.6.0"
                    .into(),
                owner: "lsst-sqre".into(),
                repo: "sqrbot-jr".into(),
                current: "0.6.0".into(),
                latest: "0.7.0".into(),
                path: path.clone(),
                state: UpdateState::Pending,
            })
        );
        assert_eq!(
            results[1].description(),
            "Update lsst-sqre/sqrbot-jr Kustomize resource from 0.6.0 to 0.7.0"
        );
    }
}
