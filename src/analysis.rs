//! Analyzers compare scanned dependencies against upstream inventories and
//! produce the updates a tree needs.

pub mod helm;
pub mod kustomize;
pub mod pre_commit;
pub mod python;

use async_trait::async_trait;
use log::*;
use std::path::Path;

use crate::{error::Result, update::Update};

pub use helm::HelmAnalyzer;
pub use kustomize::KustomizeAnalyzer;
pub use pre_commit::PreCommitAnalyzer;
pub use python::PythonAnalyzer;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Key used when reporting results grouped by analyzer.
    fn name(&self) -> &'static str;

    /// Finds the updates `root` needs. With `update` set, an analyzer that
    /// has to apply a change to detect it may leave it applied.
    async fn analyze(&self, root: &Path, update: bool) -> Result<Vec<Update>>;

    /// Analyzes `root` and applies every update found. Updates that are
    /// still pending afterwards are dropped.
    async fn update(&self, root: &Path) -> Result<Vec<Update>> {
        let mut applied = vec![];

        for update in self.analyze(root, true).await? {
            let update = update.apply().await?;

            if update.is_applied() {
                applied.push(update);
            } else {
                warn!("dropping unapplied update: {}", update.description());
            }
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        update::{PythonFrozenUpdate, UpdateState},
        virtualenv::{CommandOutput, MockCommandRunner},
    };
    use std::{path::PathBuf, sync::Arc};

    struct FixedAnalyzer(Vec<Update>);

    #[async_trait]
    impl Analyzer for FixedAnalyzer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn analyze(
            &self,
            _root: &Path,
            update: bool,
        ) -> Result<Vec<Update>> {
            assert!(update);
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn update_drops_updates_that_stay_pending() {
        let mut failing = MockCommandRunner::new();
        failing.expect_run().times(1).returning(|_, _, _| {
            Ok(CommandOutput {
                success: false,
                code: Some(1),
                ..Default::default()
            })
        });

        let applied = Update::PythonFrozen(PythonFrozenUpdate::new(
            PathBuf::from("/a/requirements"),
            UpdateState::Applied,
            Arc::new(MockCommandRunner::new()),
        ));
        let pending = Update::PythonFrozen(PythonFrozenUpdate::new(
            PathBuf::from("/b/requirements"),
            UpdateState::Pending,
            Arc::new(failing),
        ));

        let analyzer = FixedAnalyzer(vec![applied.clone(), pending]);
        let result = analyzer.update(Path::new("/a")).await.unwrap();

        assert_eq!(result, vec![applied]);
    }
}
