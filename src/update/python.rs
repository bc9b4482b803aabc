use log::*;
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::Result,
    update::UpdateState,
    virtualenv::{CommandOutput, CommandRunner},
};

pub const REGENERATE_PROGRAM: &str = "make";
pub const REGENERATE_TARGET: &str = "update-deps";

/// Regenerates the frozen dependencies of the tree at `root`.
pub async fn regenerate(
    runner: &dyn CommandRunner,
    root: &Path,
) -> Result<CommandOutput> {
    let args = vec![REGENERATE_TARGET.to_string()];
    runner
        .run(REGENERATE_PROGRAM, &args, root)
        .await?
        .check(&format!("{REGENERATE_PROGRAM} {REGENERATE_TARGET}"))
}

/// Regeneration of the frozen requirements under `requirements/`.
#[derive(Clone, Serialize)]
pub struct PythonFrozenUpdate {
    /// The `requirements` directory.
    pub path: PathBuf,
    pub state: UpdateState,
    #[serde(skip)]
    runner: Arc<dyn CommandRunner>,
}

impl PythonFrozenUpdate {
    pub fn new(
        path: PathBuf,
        state: UpdateState,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            path,
            state,
            runner,
        }
    }

    fn root(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// Runs the regeneration. A failed run is logged and leaves the update
    /// pending.
    pub async fn apply(&self) -> Result<Self> {
        if self.state == UpdateState::Applied {
            return Ok(self.clone());
        }

        if let Err(err) = regenerate(self.runner.as_ref(), self.root()).await {
            warn!("{err}");
            return Ok(self.clone());
        }

        Ok(Self {
            state: UpdateState::Applied,
            ..self.clone()
        })
    }

    pub fn description(&self) -> String {
        "Update frozen Python dependencies".to_string()
    }
}

impl fmt::Debug for PythonFrozenUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PythonFrozenUpdate")
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PythonFrozenUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.state == other.state
    }
}
