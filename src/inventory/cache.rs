use async_trait::async_trait;
use chrono::Utc;
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::sync::Mutex;

use crate::{
    error::Result,
    inventory::{ChartVersions, HelmInventory, canonicalize_url},
};

/// File name of the Helm cache inside the cache directory.
pub const HELM_CACHE_FILE: &str = "helm.yaml";

/// How long a cached repository index stays usable.
pub const DEFAULT_CACHE_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheEntry {
    /// Unix seconds at which the versions were fetched.
    timestamp: i64,
    versions: ChartVersions,
}

type CacheContents = BTreeMap<String, CacheEntry>;

/// Wraps another [`HelmInventory`] and remembers its answers on disk.
///
/// Entries are keyed by the canonical index URL and expire after the
/// configured lifetime. Each successful fetch rewrites the whole cache file.
pub struct CachedHelmInventory<I: HelmInventory> {
    inner: I,
    cache_file: PathBuf,
    lifetime: Duration,
    entries: Mutex<CacheContents>,
}

impl<I: HelmInventory> CachedHelmInventory<I> {
    /// Loads any existing cache under `cache_dir`. An unreadable cache is
    /// reported and treated as empty.
    pub fn new(inner: I, cache_dir: &Path) -> Self {
        Self::with_lifetime(inner, cache_dir, DEFAULT_CACHE_LIFETIME)
    }

    pub fn with_lifetime(
        inner: I,
        cache_dir: &Path,
        lifetime: Duration,
    ) -> Self {
        let cache_file = cache_dir.join(HELM_CACHE_FILE);

        let entries = match load_cache(&cache_file) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "ignoring unreadable cache {}: {err}",
                    cache_file.display()
                );
                CacheContents::new()
            }
        };

        Self {
            inner,
            cache_file,
            lifetime,
            entries: Mutex::new(entries),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        let age = now.saturating_sub(entry.timestamp);
        age >= 0 && (age as u64) < self.lifetime.as_secs()
    }
}

fn load_cache(path: &Path) -> Result<CacheContents> {
    if !path.is_file() {
        return Ok(CacheContents::new());
    }

    let content = std::fs::read_to_string(path)?;

    if content.trim().is_empty() {
        return Ok(CacheContents::new());
    }

    Ok(serde_yaml::from_str(&content)?)
}

async fn save_cache(path: &Path, entries: &CacheContents) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_yaml::to_string(entries)?;
    tokio::fs::write(path, content).await?;

    Ok(())
}

#[async_trait]
impl<I: HelmInventory> HelmInventory for CachedHelmInventory<I> {
    async fn inventory(&self, url: &str) -> Result<ChartVersions> {
        let now = Utc::now().timestamp();
        let key = canonicalize_url(url)?;

        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&key)
                && self.is_fresh(entry, now)
            {
                debug!("using cached inventory for {url}");
                return Ok(entry.versions.clone());
            }
        }

        let versions = self.inner.inventory(url).await?;

        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CacheEntry {
                timestamp: now,
                versions: versions.clone(),
            },
        );
        if let Err(err) = save_cache(&self.cache_file, &entries).await {
            warn!(
                "unable to save Helm cache {}: {err}",
                self.cache_file.display()
            );
        }

        Ok(versions)
    }
}
