use async_trait::async_trait;
use futures::future::join_all;
use log::*;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    sync::Arc,
};

use crate::{
    analysis::Analyzer,
    error::Result,
    inventory::{ChartVersions, HelmInventory},
    scanner::HelmScanner,
    update::{HelmUpdate, Update, UpdateState},
    version::{ParsedVersion, SemanticVersion, needs_update},
};

/// Finds Helm chart dependencies with newer releases in their repository.
pub struct HelmAnalyzer {
    inventory: Arc<dyn HelmInventory>,
    allow_expressions: bool,
}

impl HelmAnalyzer {
    pub fn new(inventory: Arc<dyn HelmInventory>, allow_expressions: bool) -> Self {
        Self {
            inventory,
            allow_expressions,
        }
    }

    /// One inventory per distinct repository, fetched concurrently.
    /// Repositories that fail are left out.
    async fn inventories<'a>(
        &self,
        repositories: BTreeSet<&'a str>,
    ) -> BTreeMap<&'a str, ChartVersions> {
        let fetches = repositories.into_iter().map(|repository| async move {
            (repository, self.inventory.inventory(repository).await)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(repository, result)| match result {
                Ok(versions) => Some((repository, versions)),
                Err(err) => {
                    warn!("skipping Helm repository {repository}: {err}");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl Analyzer for HelmAnalyzer {
    fn name(&self) -> &'static str {
        HelmScanner::NAME
    }

    async fn analyze(&self, root: &Path, _update: bool) -> Result<Vec<Update>> {
        let dependencies = HelmScanner.scan(root)?;

        let repositories = dependencies
            .iter()
            .map(|d| d.repository.as_str())
            .collect::<BTreeSet<&str>>();
        let latest = self.inventories(repositories).await;

        let mut results = vec![];

        for dependency in &dependencies {
            let Some(versions) = latest.get(dependency.repository.as_str())
            else {
                continue;
            };

            let Some(version) = versions.get(&dependency.name) else {
                warn!(
                    "Helm chart {} not found in repository {}",
                    dependency.name, dependency.repository
                );
                continue;
            };

            if !SemanticVersion::is_valid(version) {
                warn!(
                    "ignoring invalid version {version} for Helm chart {}",
                    dependency.name
                );
                continue;
            }
            let parsed = SemanticVersion::parse(version)?;

            if needs_update(&dependency.version, &parsed, self.allow_expressions)
            {
                results.push(Update::Helm(HelmUpdate {
                    name: dependency.name.clone(),
                    current: dependency.version.clone(),
                    latest: version.clone(),
                    path: dependency.path.clone(),
                    state: UpdateState::Pending,
                }));
            }
        }

        Ok(results)
    }
}
