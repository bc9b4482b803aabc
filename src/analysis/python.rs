use async_trait::async_trait;
use log::*;
use std::{path::Path, sync::Arc};

use crate::{
    analysis::Analyzer,
    error::{FreshenError, Result},
    repo::Repository,
    update::{PythonFrozenUpdate, Update, UpdateState, python::regenerate},
    virtualenv::CommandRunner,
};

/// Files that mark a tree as using frozen Python dependencies.
const REQUIRED_FILES: &[&str] = &["Makefile", "requirements/main.in"];

/// Directory holding the frozen requirements.
const REQUIREMENTS_DIR: &str = "requirements";

/// Detects frozen Python dependency updates by regenerating them.
///
/// The only way to know whether anything changed is to run the
/// regeneration, so the tree must be clean beforehand. Without `update` the
/// tree is restored afterwards and the returned update is pending.
pub struct PythonAnalyzer {
    runner: Arc<dyn CommandRunner>,
}

impl PythonAnalyzer {
    pub const NAME: &'static str = "python";

    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Analyzer for PythonAnalyzer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn analyze(&self, root: &Path, update: bool) -> Result<Vec<Update>> {
        if REQUIRED_FILES.iter().any(|f| !root.join(f).exists()) {
            return Ok(vec![]);
        }

        let repo = Repository::open(root)?;
        if repo.is_dirty()? {
            return Err(FreshenError::UncommittedChanges(root.to_path_buf()));
        }

        if let Err(err) = regenerate(self.runner.as_ref(), root).await {
            warn!("unable to regenerate Python dependencies: {err}");
            return Ok(vec![]);
        }

        if !repo.is_dirty()? {
            return Ok(vec![]);
        }

        let state = if update {
            UpdateState::Applied
        } else {
            repo.restore_worktree()?;
            UpdateState::Pending
        };

        Ok(vec![Update::PythonFrozen(PythonFrozenUpdate::new(
            root.join(REQUIREMENTS_DIR),
            state,
            self.runner.clone(),
        ))])
    }
}
