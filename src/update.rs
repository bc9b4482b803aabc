//! Update descriptors and the logic that applies them to a checkout.
//!
//! Each update starts [`UpdateState::Pending`]. Applying it returns a copy in
//! [`UpdateState::Applied`] and leaves the original untouched, so the same
//! value can be held by an analyzer result and a pull request at once.
//! Applying an already applied update does nothing.

pub mod helm;
pub mod kustomize;
pub mod pre_commit;
pub mod python;
pub mod yaml;

use serde::Serialize;
use std::path::Path;

use crate::error::Result;

pub use helm::HelmUpdate;
pub use kustomize::KustomizeUpdate;
pub use pre_commit::PreCommitUpdate;
pub use python::PythonFrozenUpdate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateState {
    #[default]
    Pending,
    Applied,
}

/// One change to one dependency declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Update {
    Helm(HelmUpdate),
    Kustomize(KustomizeUpdate),
    PreCommit(PreCommitUpdate),
    PythonFrozen(PythonFrozenUpdate),
}

impl Update {
    /// Mutates the target file and returns the applied update.
    pub async fn apply(&self) -> Result<Update> {
        Ok(match self {
            Update::Helm(u) => Update::Helm(u.apply().await?),
            Update::Kustomize(u) => Update::Kustomize(u.apply().await?),
            Update::PreCommit(u) => Update::PreCommit(u.apply().await?),
            Update::PythonFrozen(u) => Update::PythonFrozen(u.apply().await?),
        })
    }

    /// One line suitable for a commit message bullet.
    pub fn description(&self) -> String {
        match self {
            Update::Helm(u) => u.description(),
            Update::Kustomize(u) => u.description(),
            Update::PreCommit(u) => u.description(),
            Update::PythonFrozen(u) => u.description(),
        }
    }

    /// File or directory the update touches.
    pub fn path(&self) -> &Path {
        match self {
            Update::Helm(u) => &u.path,
            Update::Kustomize(u) => &u.path,
            Update::PreCommit(u) => &u.path,
            Update::PythonFrozen(u) => &u.path,
        }
    }

    pub fn state(&self) -> UpdateState {
        match self {
            Update::Helm(u) => u.state,
            Update::Kustomize(u) => u.state,
            Update::PreCommit(u) => u.state,
            Update::PythonFrozen(u) => u.state,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.state() == UpdateState::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use tempfile::TempDir;

    #[tokio::test]
    async fn apply_through_enum_keeps_original_pending() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".pre-commit-config.yaml");
        fs::write(
            &path,
            "repos:\n  - repo: https://github.com/psf/black\n    rev: 19.10b0\n",
        )
        .unwrap();

        let update = Update::PreCommit(PreCommitUpdate {
            repository: "https://github.com/psf/black".into(),
            current: "19.10b0".into(),
            latest: "20.8b1".into(),
            path: path.clone(),
            state: UpdateState::Pending,
        });

        let applied = update.apply().await.unwrap();

        assert!(applied.is_applied());
        assert!(!update.is_applied());
        assert_eq!(applied.path(), path.as_path());
        assert_eq!(
            applied.description(),
            "Update psf/black pre-commit hook from 19.10b0 to 20.8b1"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let update = Update::Helm(HelmUpdate {
            name: "redis".into(),
            current: "1.3.1".into(),
            latest: "v1.4.0".into(),
            path: PathBuf::from("chart/Chart.yaml"),
            state: UpdateState::Pending,
        });

        let yaml = serde_yaml::to_string(&update).unwrap();

        assert!(yaml.contains("kind: helm"));
        assert!(yaml.contains("state: pending"));
    }
}
