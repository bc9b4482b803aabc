use async_trait::async_trait;
use log::*;
use serde::Deserialize;
use std::{collections::BTreeMap, time::Duration};
use url::Url;

use crate::{
    error::{FreshenError, Result},
    inventory::{ChartVersions, HelmInventory},
    scanner::util::scalar_string,
    version::{SemanticVersion, latest_of},
};

const INDEX_FILE: &str = "index.yaml";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct HelmIndex {
    #[serde(default)]
    entries: BTreeMap<String, Option<Vec<serde_yaml::Value>>>,
}

/// URL of the `index.yaml` for a Helm repository. URLs that already point
/// at `index.yaml` are returned unchanged.
pub fn canonicalize_url(url: &str) -> Result<String> {
    if url.ends_with("/index.yaml") {
        return Ok(url.to_string());
    }

    let base = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };

    Ok(Url::parse(&base)?.join(INDEX_FILE)?.to_string())
}

/// Reduces a Helm index to the highest valid semantic version per chart.
/// Releases without a usable version are skipped.
pub fn parse_index(content: &str) -> Result<ChartVersions> {
    let index: HelmIndex = serde_yaml::from_str(content)?;
    let mut results = ChartVersions::new();

    for (name, releases) in index.entries {
        let versions = releases
            .unwrap_or_default()
            .iter()
            .filter_map(|r| scalar_string(r.get("version")))
            .collect::<Vec<String>>();

        if let Some(latest) =
            latest_of::<SemanticVersion, _>(versions.iter().map(String::as_str))
        {
            results.insert(name, latest);
        }
    }

    Ok(results)
}

/// Fetches chart versions straight from a repository's index.
pub struct HelmRepositoryInventory {
    client: reqwest::Client,
}

impl HelmRepositoryInventory {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("freshen/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HelmInventory for HelmRepositoryInventory {
    async fn inventory(&self, url: &str) -> Result<ChartVersions> {
        let url = canonicalize_url(url)?;
        info!("inventorying {url}");

        let content = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FreshenError::upstream(&url, e))?
            .text()
            .await
            .map_err(|e| FreshenError::upstream(&url, e))?;

        parse_index(&content).map_err(|e| FreshenError::upstream(&url, e))
    }
}
