use log::*;
use std::path::Path;

use crate::{
    dependency::HelmDependency,
    error::Result,
    scanner::util::{find_files, load_yaml, scalar_string},
};

const CHART_FILES: &[&str] = &["Chart.yaml", "requirements.yaml"];

/// Finds chart dependencies in `Chart.yaml` (current syntax) and
/// `requirements.yaml` (older syntax).
pub struct HelmScanner;

impl HelmScanner {
    pub const NAME: &'static str = "helm";

    pub fn scan(&self, root: &Path) -> Result<Vec<HelmDependency>> {
        let mut results = vec![];

        for path in find_files(root, CHART_FILES)? {
            results.extend(self.dependencies_in(&path));
        }

        Ok(results)
    }

    fn dependencies_in(&self, path: &Path) -> Vec<HelmDependency> {
        let Some(doc) = load_yaml(path) else {
            return vec![];
        };

        let Some(entries) = doc.get("dependencies").and_then(|d| d.as_sequence())
        else {
            return vec![];
        };

        let mut results = vec![];

        for entry in entries {
            let name = scalar_string(entry.get("name"));
            let version = scalar_string(entry.get("version"));
            let repository = scalar_string(entry.get("repository"));

            let (Some(name), Some(version), Some(repository)) =
                (name, version, repository)
            else {
                warn!("malformed dependency in {}", path.display());
                continue;
            };

            if !repository.starts_with("https://")
                && !repository.starts_with("http://")
            {
                debug!(
                    "skipping {name} in {}: unsupported repository {repository}",
                    path.display()
                );
                continue;
            }

            let version = version.strip_prefix('v').unwrap_or(&version);

            results.push(HelmDependency {
                name,
                version: version.to_string(),
                repository,
                path: path.to_path_buf(),
            });
        }

        results
    }
}
