//! Publishes applied updates as a single pull request per repository.
//!
//! Each cycle commits the updates on the current branch, force-pushes it
//! and then either updates the open pull request from that branch or
//! creates one. Enabling auto-merge is attempted last and never fails the
//! cycle.
use async_trait::async_trait;
use git_url_parse::GitUrl;
use log::*;
#[cfg(test)]
use mockall::automock;
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, path::PathBuf, sync::Arc};
use url::Url;

use crate::{
    error::{FreshenError, Result},
    forge::{
        config::DEFAULT_GITHUB_HOST,
        traits::Forge,
        types::{
            AutoMergeRequest, CreatePrRequest, GetPrRequest, GithubRepo,
            UpdatePrRequest,
        },
    },
    repo::Repository,
    update::Update,
};

/// Title of every commit and pull request.
pub const COMMIT_TITLE: &str = "Update dependencies";

/// A commit message made of a fixed title and one bullet per change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub title: String,
    pub changes: Vec<String>,
}

impl CommitMessage {
    pub fn from_updates(updates: &[Update]) -> Self {
        Self {
            title: COMMIT_TITLE.to_string(),
            changes: updates.iter().map(Update::description).collect(),
        }
    }

    pub fn body(&self) -> String {
        format!("- {}\n", self.changes.join("\n- "))
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.title, self.body())
    }
}

/// Pushes a branch of a local checkout to a remote URL.
#[cfg_attr(test, automock)]
pub trait Pusher: Send + Sync {
    fn push(&self, repo: &Repository, url: &str, branch: &str) -> Result<()>;
}

/// Pushes with git through a temporary remote.
pub struct GitPusher;

impl Pusher for GitPusher {
    fn push(&self, repo: &Repository, url: &str, branch: &str) -> Result<()> {
        repo.push_branch(url, branch)
    }
}

/// Owner and repository of a GitHub remote URL. Accepts https, ssh and the
/// scp-like `user@host:path` form.
pub fn github_repo_from_url(url: &str) -> Result<GithubRepo> {
    let parsed = GitUrl::parse(url)?;

    let Some(owner) = parsed.owner.filter(|o| !o.is_empty()) else {
        return Err(FreshenError::InvalidRemoteUrl(url.to_string()));
    };

    if parsed.name.is_empty() {
        return Err(FreshenError::InvalidRemoteUrl(url.to_string()));
    }

    Ok(GithubRepo::new(owner, parsed.name))
}

/// Rewrites a remote URL as https with `user` and `token` in its userinfo.
pub fn authenticated_url(
    url: &str,
    user: &str,
    token: &SecretString,
) -> Result<String> {
    let parsed = GitUrl::parse(url)?;
    let host = parsed
        .host
        .clone()
        .unwrap_or_else(|| DEFAULT_GITHUB_HOST.to_string());
    let path = parsed.path.trim_start_matches('/');

    let mut https = Url::parse(&format!("https://{host}/{path}"))?;
    let invalid = |_| FreshenError::InvalidRemoteUrl(url.to_string());
    https.set_username(user).map_err(invalid)?;
    https
        .set_password(Some(token.expose_secret()))
        .map_err(invalid)?;

    Ok(https.to_string())
}

/// Settings for commits and pull requests.
#[derive(Debug, Clone)]
pub struct PullRequestConfig {
    pub github_user: String,
    pub github_email: Option<String>,
    pub token: SecretString,
    pub auto_merge: bool,
}

/// Commits, pushes and opens or refreshes the pull request for a checkout.
pub struct PullRequester {
    forge: Arc<dyn Forge>,
    pusher: Arc<dyn Pusher>,
    config: PullRequestConfig,
}

impl PullRequester {
    pub fn new(
        forge: Arc<dyn Forge>,
        pusher: Arc<dyn Pusher>,
        config: PullRequestConfig,
    ) -> Self {
        Self {
            forge,
            pusher,
            config,
        }
    }

    /// Name and email for commits. A configured email wins; otherwise the
    /// token owner's public profile is used.
    async fn commit_identity(&self) -> Result<(String, String)> {
        if let Some(email) = &self.config.github_email {
            return Ok((self.config.github_user.clone(), email.clone()));
        }

        let user = self.forge.current_user().await?;
        Ok((user.display_name(), user.commit_email()))
    }

    fn commit_changes(
        &self,
        repo: &Repository,
        updates: &[Update],
        message: &CommitMessage,
        identity: &(String, String),
    ) -> Result<()> {
        let paths = updates
            .iter()
            .map(|u| u.path().to_path_buf())
            .collect::<Vec<PathBuf>>();

        repo.stage_paths(&paths)?;
        repo.commit(&message.to_string(), &identity.0, &identity.1)
    }

    /// Publish `updates`, which must already be applied to the checkout.
    pub async fn make_pull_request(
        &self,
        repo: &Repository,
        updates: &[Update],
    ) -> Result<()> {
        let origin = repo.origin_url()?;
        let github_repo = github_repo_from_url(&origin)?;
        let branch = repo.current_branch()?;

        let default_branch = self.forge.default_branch(&github_repo).await?;

        let existing = self
            .forge
            .find_open_pr(GetPrRequest {
                repo: github_repo.clone(),
                head_branch: branch.clone(),
                base_branch: default_branch.clone(),
            })
            .await?;

        let message = CommitMessage::from_updates(updates);
        let identity = self.commit_identity().await?;
        self.commit_changes(repo, updates, &message, &identity)?;

        let remote_url = authenticated_url(
            &origin,
            &self.config.github_user,
            &self.config.token,
        )?;
        self.pusher.push(repo, &remote_url, &branch)?;

        let pr_number = match existing {
            Some(pr) => {
                info!("updating pull request {github_repo}#{}", pr.number);
                self.forge
                    .update_pr(UpdatePrRequest {
                        repo: github_repo.clone(),
                        pr_number: pr.number,
                        title: message.title.clone(),
                        body: message.body(),
                    })
                    .await?;
                pr.number
            }
            None => {
                let pr = self
                    .forge
                    .create_pr(CreatePrRequest {
                        repo: github_repo.clone(),
                        head_branch: branch.clone(),
                        base_branch: default_branch,
                        title: message.title.clone(),
                        body: message.body(),
                    })
                    .await?;
                info!("created pull request {github_repo}#{}", pr.number);
                pr.number
            }
        };

        if self.config.auto_merge
            && let Err(err) = self
                .forge
                .enable_auto_merge(AutoMergeRequest {
                    repo: github_repo.clone(),
                    pr_number,
                })
                .await
        {
            warn!("unable to enable auto-merge for {github_repo}#{pr_number}: {err}");
        }

        Ok(())
    }
}
