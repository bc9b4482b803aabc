//! Traits related to remote git forges
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::types::{
        AutoMergeRequest, CreatePrRequest, GetPrRequest, GithubRepo,
        GithubUser, PullRequest, UpdatePrRequest,
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// The account the token belongs to.
    async fn current_user(&self) -> Result<GithubUser>;
    /// Default branch of `repo`, `main` when the API does not report one.
    async fn default_branch(&self, repo: &GithubRepo) -> Result<String>;
    /// Every tag name in `repo`, across all pages.
    async fn list_tags(&self, repo: &GithubRepo) -> Result<Vec<String>>;
    async fn find_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()>;
    async fn enable_auto_merge(&self, req: AutoMergeRequest) -> Result<()>;
}
