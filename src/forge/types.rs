use serde::Deserialize;
use std::fmt;

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
}

impl GithubRepo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Public profile of the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl GithubUser {
    /// Display name, falling back to the login.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.login.clone(),
        }
    }

    /// Public email, falling back to the account's noreply address.
    pub fn commit_email(&self) -> String {
        match &self.email {
            Some(email) if !email.is_empty() => email.clone(),
            _ => format!("{}+{}@users.noreply.github.com", self.id, self.login),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Pull request information.
pub struct PullRequest {
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to find an open pull request by branch names.
pub struct GetPrRequest {
    pub repo: GithubRepo,
    pub head_branch: String,
    pub base_branch: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub repo: GithubRepo,
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to update the title and body of an existing pull request.
pub struct UpdatePrRequest {
    pub repo: GithubRepo,
    pub pr_number: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to turn on auto-merge for a pull request.
pub struct AutoMergeRequest {
    pub repo: GithubRepo,
    pub pr_number: u64,
}
