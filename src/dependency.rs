//! Dependency records discovered by the scanners.
//!
//! Records are created fresh on every scan and never mutated. Each one names
//! the declaring file, the pinned version (which may be a range expression)
//! and whatever identifies its upstream source.
use serde::Serialize;
use std::path::PathBuf;

/// A chart listed under `dependencies` in `Chart.yaml` or
/// `requirements.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelmDependency {
    pub name: String,
    pub version: String,
    pub repository: String,
    pub path: PathBuf,
}

/// A remote GitHub resource referenced from `kustomization.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KustomizeDependency {
    /// The full resource string as written.
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub version: String,
    pub path: PathBuf,
}

/// A hook repository pinned in `.pre-commit-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreCommitDependency {
    pub repository: String,
    pub owner: String,
    pub repo: String,
    pub version: String,
    pub path: PathBuf,
}

/// Any scanned dependency, tagged by kind for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Dependency {
    Helm(HelmDependency),
    Kustomize(KustomizeDependency),
    PreCommit(PreCommitDependency),
}

impl Dependency {
    pub fn version(&self) -> &str {
        match self {
            Dependency::Helm(d) => &d.version,
            Dependency::Kustomize(d) => &d.version,
            Dependency::PreCommit(d) => &d.version,
        }
    }
}
