use serde::Serialize;
use std::path::PathBuf;

use crate::{
    error::Result,
    update::{
        UpdateState,
        yaml::{RecordEdit, update_record},
    },
};

/// New version for a chart listed under `dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelmUpdate {
    pub name: String,
    pub current: String,
    pub latest: String,
    pub path: PathBuf,
    pub state: UpdateState,
}

impl HelmUpdate {
    /// Sets the version of every dependency named `name` in the chart file.
    pub async fn apply(&self) -> Result<Self> {
        if self.state == UpdateState::Applied {
            return Ok(self.clone());
        }

        let edit = RecordEdit {
            sequence: "dependencies",
            key: "name",
            key_value: &self.name,
            field: "version",
            value: &self.latest,
        };
        update_record(&self.path, &edit).await?;

        Ok(Self {
            state: UpdateState::Applied,
            ..self.clone()
        })
    }

    pub fn description(&self) -> String {
        format!(
            "Update {} Helm chart from {} to {}",
            self.name, self.current, self.latest
        )
    }
}
