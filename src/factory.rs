//! Builds analyzers, inventories and the pull request manager from a
//! [`Config`].
use log::*;
use std::sync::Arc;

use crate::{
    analysis::{
        Analyzer, HelmAnalyzer, KustomizeAnalyzer, PreCommitAnalyzer,
        PythonAnalyzer,
    },
    config::Config,
    error::Result,
    forge::{config::RemoteConfig, github::Github, traits::Forge},
    inventory::{
        CachedHelmInventory, GitHubInventory, GitHubTagInventory,
        HelmInventory, HelmRepositoryInventory,
    },
    pr::{GitPusher, PullRequestConfig, PullRequester},
    virtualenv::{CommandRunner, VirtualEnv},
};

pub struct Factory {
    config: Config,
}

impl Factory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// GitHub API client authenticated with the configured token.
    pub fn create_forge(&self) -> Result<Arc<dyn Forge>> {
        let remote = RemoteConfig {
            token: self.config.github_token.clone(),
            ..RemoteConfig::default()
        };

        Ok(Arc::new(Github::new(remote)?))
    }

    /// Helm inventory, wrapped in the disk cache unless caching is off.
    pub fn create_helm_inventory(&self) -> Result<Arc<dyn HelmInventory>> {
        let inventory = HelmRepositoryInventory::new()?;

        if !self.config.cache_enabled {
            return Ok(Arc::new(inventory));
        }

        debug!(
            "caching Helm inventories in {}",
            self.config.cache_path.display()
        );

        Ok(Arc::new(CachedHelmInventory::new(
            inventory,
            &self.config.cache_path,
        )))
    }

    pub fn create_github_inventory(&self) -> Result<Arc<dyn GitHubInventory>> {
        Ok(Arc::new(GitHubTagInventory::new(self.create_forge()?)))
    }

    /// Runner for Python regeneration, inside the shared virtual
    /// environment under the work area.
    pub fn create_runner(&self) -> Arc<dyn CommandRunner> {
        Arc::new(VirtualEnv::new(self.config.venv_path()))
    }

    /// Every analyzer, Python first so that its clean-tree check runs
    /// before any other analyzer has modified files.
    pub fn create_all_analyzers(&self) -> Result<Vec<Box<dyn Analyzer>>> {
        let github = self.create_github_inventory()?;

        let analyzers: Vec<Box<dyn Analyzer>> = vec![
            Box::new(PythonAnalyzer::new(self.create_runner())),
            Box::new(HelmAnalyzer::new(
                self.create_helm_inventory()?,
                self.config.allow_expressions,
            )),
            Box::new(KustomizeAnalyzer::new(github.clone())),
            Box::new(PreCommitAnalyzer::new(github)),
        ];

        Ok(analyzers)
    }

    /// Fails when GitHub credentials are missing.
    pub fn create_pull_requester(&self) -> Result<PullRequester> {
        self.config.require_github_credentials()?;

        Ok(PullRequester::new(
            self.create_forge()?,
            Arc::new(GitPusher),
            PullRequestConfig {
                github_user: self.config.github_user.clone(),
                github_email: self.config.github_email.clone(),
                token: self.config.github_token.clone(),
                auto_merge: self.config.auto_merge,
            },
        ))
    }
}
