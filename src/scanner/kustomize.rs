use regex::Regex;
use std::{path::Path, sync::LazyLock};

use crate::{
    dependency::KustomizeDependency,
    error::Result,
    scanner::util::{find_files, load_yaml},
};

/// Matches `github.com/<owner>/<repo>(.git)?//<path>?ref=<version>`.
/// Captures owner, repository and tag.
static RESOURCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^github\.com/([^/]+)/([^/.]+).*?ref=(.*)").unwrap()
});

/// Finds remote GitHub resources in `kustomization.yaml` files.
pub struct KustomizeScanner;

impl KustomizeScanner {
    pub const NAME: &'static str = "kustomize";

    pub fn scan(&self, root: &Path) -> Result<Vec<KustomizeDependency>> {
        let mut results = vec![];

        for path in find_files(root, &["kustomization.yaml"])? {
            let Some(doc) = load_yaml(&path) else {
                continue;
            };

            let Some(resources) =
                doc.get("resources").and_then(|r| r.as_sequence())
            else {
                continue;
            };

            for resource in resources.iter().filter_map(|r| r.as_str()) {
                if let Some(caps) = RESOURCE_REGEX.captures(resource) {
                    results.push(KustomizeDependency {
                        url: resource.to_string(),
                        owner: caps[1].to_string(),
                        repo: caps[2].to_string(),
                        version: caps[3].to_string(),
                        path: path.clone(),
                    });
                }
            }
        }

        Ok(results)
    }
}
