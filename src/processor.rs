//! Drives analyze, update and publish cycles over checkouts.
use color_eyre::eyre::eyre;
use log::*;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    analysis::Analyzer,
    config::RepositoryConfig,
    error::{FreshenError, Result},
    pr::PullRequester,
    repo::Repository,
    update::Update,
};

/// Base URL repositories are cloned from.
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// Updates each analyzer finds in `root`, keyed by analyzer name.
/// Analyzers that find nothing are left out.
pub async fn analyze_checkout(
    analyzers: &[Box<dyn Analyzer>],
    root: &Path,
) -> Result<BTreeMap<&'static str, Vec<Update>>> {
    let mut results = BTreeMap::new();

    for analyzer in analyzers {
        let updates = analyzer.analyze(root, false).await?;
        if !updates.is_empty() {
            results.insert(analyzer.name(), updates);
        }
    }

    Ok(results)
}

/// Applies every update the analyzers find in `root` and returns the
/// applied ones in analyzer order.
pub async fn update_checkout(
    analyzers: &[Box<dyn Analyzer>],
    root: &Path,
) -> Result<Vec<Update>> {
    let mut updates = vec![];

    for analyzer in analyzers {
        debug!("running {} analyzer on {}", analyzer.name(), root.display());
        updates.extend(analyzer.update(root).await?);
    }

    Ok(updates)
}

/// Puts a checkout back on its original branch and removes the tool branch
/// when dropped.
struct BranchGuard<'a> {
    repo: &'a Repository,
    original: String,
    branch: &'a str,
}

impl<'a> BranchGuard<'a> {
    fn switch(repo: &'a Repository, branch: &'a str) -> Result<Self> {
        let original = repo.current_branch()?;

        if original == branch {
            return Err(FreshenError::Other(eyre!(
                "{} is already on {branch}; check out another branch first",
                repo.workdir()?.display()
            )));
        }

        repo.create_branch(branch)?;

        let guard = Self {
            repo,
            original,
            branch,
        };
        repo.switch_branch(branch)?;

        Ok(guard)
    }
}

impl Drop for BranchGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.repo.switch_branch(&self.original) {
            error!("unable to switch back to {}: {err}", self.original);
            return;
        }

        if let Err(err) = self.repo.delete_branch(self.branch) {
            warn!("unable to delete branch {}: {err}", self.branch);
        }
    }
}

/// Runs full update cycles: branch, update, commit, push and pull request.
pub struct Processor {
    analyzers: Vec<Box<dyn Analyzer>>,
    pull_requester: PullRequester,
    branch: String,
    work_area: PathBuf,
    base_url: String,
}

impl Processor {
    pub fn new(
        analyzers: Vec<Box<dyn Analyzer>>,
        pull_requester: PullRequester,
        branch: impl Into<String>,
        work_area: impl Into<PathBuf>,
    ) -> Self {
        Self {
            analyzers,
            pull_requester,
            branch: branch.into(),
            work_area: work_area.into(),
            base_url: GITHUB_BASE_URL.to_string(),
        }
    }

    /// Clone from somewhere other than GitHub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// One cycle on an existing checkout. The tool branch is recreated from
    /// HEAD, and the original branch is checked out again afterwards even
    /// when the cycle fails. A checkout with uncommitted changes is refused
    /// before anything is switched.
    pub async fn process_checkout(&self, path: &Path) -> Result<Vec<Update>> {
        let repo = Repository::open(path)?;

        if repo.is_dirty()? {
            return Err(FreshenError::UncommittedChanges(path.to_path_buf()));
        }

        let _guard = BranchGuard::switch(&repo, &self.branch)?;

        let updates = update_checkout(&self.analyzers, path).await?;

        if updates.is_empty() {
            info!("{} is up to date", path.display());
            return Ok(updates);
        }

        info!("{} updates for {}", updates.len(), path.display());
        self.pull_requester.make_pull_request(&repo, &updates).await?;

        Ok(updates)
    }

    /// Clones or refreshes each repository under the work area and runs a
    /// cycle on it. A failing repository does not stop the others but
    /// fails the run.
    pub async fn process(
        &self,
        repositories: &[RepositoryConfig],
    ) -> Result<()> {
        let mut failed = vec![];

        for repository in repositories {
            let name = format!("{}/{}", repository.owner, repository.repo);
            info!("processing {name}");

            if let Err(err) = self.process_repository(repository).await {
                error!("processing {name} failed: {err}");
                failed.push(name);
            }
        }

        if !failed.is_empty() {
            return Err(FreshenError::Other(eyre!(
                "failed to process: {}",
                failed.join(", ")
            )));
        }

        Ok(())
    }

    async fn process_repository(
        &self,
        repository: &RepositoryConfig,
    ) -> Result<()> {
        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            repository.owner,
            repository.repo
        );
        let path = self.work_area.join(&repository.repo);

        Repository::clone_or_update(&path, &url)?;
        self.process_checkout(&path).await?;

        Ok(())
    }
}
