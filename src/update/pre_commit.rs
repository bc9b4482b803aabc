use serde::Serialize;
use std::path::PathBuf;
use url::Url;

use crate::{
    error::Result,
    update::{
        UpdateState,
        yaml::{RecordEdit, update_record},
    },
};

/// New revision for a hook repository in `.pre-commit-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreCommitUpdate {
    pub repository: String,
    pub current: String,
    pub latest: String,
    pub path: PathBuf,
    pub state: UpdateState,
}

impl PreCommitUpdate {
    pub async fn apply(&self) -> Result<Self> {
        if self.state == UpdateState::Applied {
            return Ok(self.clone());
        }

        let edit = RecordEdit {
            sequence: "repos",
            key: "repo",
            key_value: &self.repository,
            field: "rev",
            value: &self.latest,
        };
        update_record(&self.path, &edit).await?;

        Ok(Self {
            state: UpdateState::Applied,
            ..self.clone()
        })
    }

    pub fn description(&self) -> String {
        let name = Url::parse(&self.repository)
            .map(|u| u.path().trim_start_matches('/').to_string())
            .unwrap_or_else(|_| self.repository.clone());

        format!(
            "Update {name} pre-commit hook from {} to {}",
            self.current, self.latest
        )
    }
}
