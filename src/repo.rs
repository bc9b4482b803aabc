//! Git repository operations and management.
//!
//! A thin layer over `git2` covering what an update cycle needs:
//!
//! - Cloning or refreshing a checkout in the work area
//! - Creating, switching, restoring and deleting the tool branch
//! - Detecting and discarding working tree changes
//! - Staging specific paths and committing with an explicit identity
//! - Force-pushing through a temporary authenticated remote
//!
//! # Usage
//!
//! ```rust,ignore
//! let repo = Repository::open(Path::new("./checkout"))?;
//! let original = repo.current_branch()?;
//! repo.create_branch("u/freshen")?;
//! repo.switch_branch("u/freshen")?;
//! // Make changes...
//! repo.stage_paths(&[Path::new("Chart.yaml")])?;
//! repo.commit("Update dependencies", "Someone", "someone@example.com")?;
//! repo.switch_branch(&original)?;
//! ```
use color_eyre::eyre::eyre;
use git2::{RemoteCallbacks, Status, StatusOptions};
use log::*;
use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};
use url::Url;

use crate::error::{FreshenError, Result};

/// Name of the remote a checkout is cloned from.
pub const ORIGIN_REMOTE: &str = "origin";

/// Remote added for a single push and removed right after.
pub const TEMPORARY_REMOTE: &str = "tmp-freshen";

/// Create Git authentication callbacks for username/token authentication.
fn get_auth_callbacks<'r>(user: String, token: String) -> RemoteCallbacks<'r> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        git2::Cred::userpass_plaintext(&user, &token)
    });
    callbacks
}

/// Credentials embedded in the userinfo of an https URL, if any.
fn url_credentials(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    let password = parsed.password()?;
    if parsed.username().is_empty() {
        return None;
    }
    Some((parsed.username().to_string(), password.to_string()))
}

/// High-level interface to a local checkout.
pub struct Repository {
    repo: git2::Repository,
}

impl Repository {
    /// Open the checkout whose working tree is at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = git2::Repository::open(path)?;
        Ok(Self { repo })
    }

    /// Clone `url` into `path`, or refresh an existing clone there.
    ///
    /// An existing clone has its current branch hard reset to the fetched
    /// tip of the same branch on origin. The work area belongs to the tool,
    /// so local changes in it are discarded.
    pub fn clone_or_update(path: &Path, url: &str) -> Result<Self> {
        if path.join(".git").is_dir() {
            let repo = Self::open(path)?;
            repo.update_from_origin()?;
            return Ok(repo);
        }

        info!("cloning {url} into {}", path.display());
        let repo = git2::Repository::clone(url, path)?;

        Ok(Self { repo })
    }

    fn update_from_origin(&self) -> Result<()> {
        let branch = self.current_branch()?;
        info!("updating {} from {ORIGIN_REMOTE}/{branch}", self.workdir_display());

        let mut remote = self.repo.find_remote(ORIGIN_REMOTE)?;
        remote.fetch(&[branch.as_str()], None, None)?;

        let fetch_head = self.repo.find_reference("FETCH_HEAD")?;
        let commit = fetch_head.peel_to_commit()?;
        self.repo
            .reset(commit.as_object(), git2::ResetType::Hard, None)?;

        Ok(())
    }

    /// Get the repository's working directory path.
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or_else(|| {
            FreshenError::Other(eyre!("Repository has no working directory"))
        })
    }

    fn workdir_display(&self) -> String {
        self.repo
            .workdir()
            .map(|w| w.display().to_string())
            .unwrap_or_else(|| ".".into())
    }

    /// Name of the checked out branch. Fails on a detached HEAD.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if !head.is_branch() {
            return Err(FreshenError::Other(eyre!(
                "HEAD of {} is not a branch",
                self.workdir_display()
            )));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| FreshenError::Other(eyre!("branch name is not UTF-8")))
    }

    /// Create a branch at HEAD, replacing any branch of the same name.
    pub fn create_branch(&self, branch: &str) -> Result<()> {
        info!("creating branch: {branch}");
        let head = self.repo.head()?;
        let commit = head.peel_to_commit()?;
        self.repo.branch(branch, &commit, true)?;
        Ok(())
    }

    /// Check out `branch` and point HEAD at it.
    pub fn switch_branch(&self, branch: &str) -> Result<()> {
        info!("switching to branch: {branch}");
        let ref_name = format!("refs/heads/{branch}");
        let target_obj = self.repo.revparse_single(&ref_name)?;
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_tree(&target_obj, Some(&mut checkout))?;
        self.repo.set_head(&ref_name)?;
        Ok(())
    }

    /// Delete a local branch. A branch that does not exist is ignored.
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        match self.repo.find_branch(branch, git2::BranchType::Local) {
            Ok(mut found) => {
                debug!("deleting branch: {branch}");
                found.delete()?;
                Ok(())
            }
            Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether any tracked file differs from HEAD, staged or not.
    /// Untracked files are ignored.
    pub fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;

        Ok(statuses
            .iter()
            .any(|entry| entry.status() != Status::CURRENT))
    }

    /// Discard changes to tracked files in the working tree.
    pub fn restore_worktree(&self) -> Result<()> {
        debug!("restoring working tree of {}", self.workdir_display());
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))?;
        Ok(())
    }

    /// Stage the given files or directories, including deletions.
    pub fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let workdir = self.workdir()?.to_path_buf();

        let specs = paths
            .iter()
            .map(|p| {
                p.strip_prefix(&workdir)
                    .unwrap_or(p)
                    .to_string_lossy()
                    .into_owned()
            })
            .collect::<Vec<String>>();

        debug!("staging {}", specs.join(", "));

        let mut index = self.repo.index()?;
        index.add_all(specs.iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(specs.iter(), None)?;
        index.write()?;

        Ok(())
    }

    /// Create a commit from the index on the current branch.
    pub fn commit(&self, msg: &str, name: &str, email: &str) -> Result<()> {
        debug!("committing changes as {name} <{email}>");
        let mut index = self.repo.index()?;
        let oid = index.write_tree()?;
        let tree = self.repo.find_tree(oid)?;
        let parent_commit = self.repo.head()?.peel_to_commit()?;
        let signature = git2::Signature::now(name, email)?;
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            msg,
            &tree,
            &[&parent_commit],
        )?;
        Ok(())
    }

    /// URL of the origin remote.
    pub fn origin_url(&self) -> Result<String> {
        let remote = self.repo.find_remote(ORIGIN_REMOTE)?;
        remote.url().map(str::to_string).ok_or_else(|| {
            FreshenError::InvalidRemoteUrl("origin URL is not UTF-8".into())
        })
    }

    /// Force-push `branch` to the same name at `url` through a temporary
    /// remote. The remote is removed whether or not the push succeeds, and a
    /// rejected reference fails with `PushFailed`.
    pub fn push_branch(&self, url: &str, branch: &str) -> Result<()> {
        info!("pushing branch {branch}");

        if self.repo.find_remote(TEMPORARY_REMOTE).is_ok() {
            self.repo.remote_delete(TEMPORARY_REMOTE)?;
        }

        let result = self.push_to_temporary_remote(url, branch);

        if let Err(err) = self.repo.remote_delete(TEMPORARY_REMOTE) {
            warn!("unable to remove remote {TEMPORARY_REMOTE}: {err}");
        }

        result
    }

    fn push_to_temporary_remote(&self, url: &str, branch: &str) -> Result<()> {
        let mut remote = self.repo.remote(TEMPORARY_REMOTE, url)?;
        let rejected: RefCell<Vec<String>> = RefCell::new(vec![]);

        {
            let mut callbacks = match url_credentials(url) {
                Some((user, token)) => get_auth_callbacks(user, token),
                None => RemoteCallbacks::new(),
            };
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejected.borrow_mut().push(format!("{refname}: {message}"));
                }
                Ok(())
            });

            let mut push_opts = git2::PushOptions::default();
            push_opts.remote_callbacks(callbacks);

            // + indicates "force" push
            let ref_spec = format!("+refs/heads/{branch}:refs/heads/{branch}");
            remote
                .push(&[ref_spec], Some(&mut push_opts))
                .map_err(|e| FreshenError::push_failed(branch, e.message()))?;
        }

        let rejected = rejected.into_inner();
        if !rejected.is_empty() {
            return Err(FreshenError::push_failed(branch, rejected.join(", ")));
        }

        Ok(())
    }
}
