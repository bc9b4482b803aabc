use regex::Regex;
use serde::Serialize;
use std::{path::PathBuf, sync::LazyLock};

use crate::{
    error::{FreshenError, Result},
    update::{UpdateState, yaml::replace_item},
};

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/]+/[^/.]+)").unwrap());

/// New tag for a remote resource in `kustomization.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KustomizeUpdate {
    /// The resource exactly as it appears in the file.
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub current: String,
    pub latest: String,
    pub path: PathBuf,
    pub state: UpdateState,
}

impl KustomizeUpdate {
    /// The resource string with its `?ref=` suffix pointing at `latest`.
    fn updated_url(&self) -> Result<String> {
        let suffix =
            Regex::new(&format!(r"\?ref={}$", regex::escape(&self.current)))?;
        Ok(suffix
            .replace(&self.url, format!("?ref={}", self.latest).as_str())
            .into_owned())
    }

    pub async fn apply(&self) -> Result<Self> {
        if self.state == UpdateState::Applied {
            return Ok(self.clone());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let new_url = self.updated_url()?;

        let Some(updated) =
            replace_item(&content, "resources", &self.url, &new_url)
        else {
            return Err(FreshenError::dependency_not_found(
                &self.url, &self.path,
            ));
        };

        tokio::fs::write(&self.path, updated).await?;

        Ok(Self {
            state: UpdateState::Applied,
            ..self.clone()
        })
    }

    pub fn description(&self) -> String {
        let name = NAME_REGEX
            .captures(&self.url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| format!("{}/{}", self.owner, self.repo));

        format!(
            "Update {name} Kustomize resource from {} to {}",
            self.current, self.latest
        )
    }
}
