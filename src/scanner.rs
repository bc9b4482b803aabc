//! Scanners that walk a source tree and parse dependency declarations.

pub mod helm;
pub mod kustomize;
pub mod pre_commit;
pub(crate) mod util;

use std::{collections::BTreeMap, path::Path};

use crate::{dependency::Dependency, error::Result};

pub use helm::HelmScanner;
pub use kustomize::KustomizeScanner;
pub use pre_commit::PreCommitScanner;

/// Runs every scanner against `root` and groups the results by scanner name.
pub fn scan_all(root: &Path) -> Result<BTreeMap<&'static str, Vec<Dependency>>> {
    let mut results = BTreeMap::new();

    let helm = HelmScanner.scan(root)?;
    results.insert(
        HelmScanner::NAME,
        helm.into_iter().map(Dependency::Helm).collect(),
    );

    let kustomize = KustomizeScanner.scan(root)?;
    results.insert(
        KustomizeScanner::NAME,
        kustomize.into_iter().map(Dependency::Kustomize).collect(),
    );

    let pre_commit = PreCommitScanner.scan(root)?;
    results.insert(
        PreCommitScanner::NAME,
        pre_commit.into_iter().map(Dependency::PreCommit).collect(),
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_all_groups_by_scanner() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Chart.yaml"),
            "dependencies:\n  - name: redis\n    version: 1.0.0\n    repository: https://charts.example.com\n",
        )
        .unwrap();

        let results = scan_all(tmp.path()).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results["helm"].len(), 1);
        assert_eq!(results["helm"][0].version(), "1.0.0");
        assert!(results["kustomize"].is_empty());
        assert!(results["pre-commit"].is_empty());
    }
}
