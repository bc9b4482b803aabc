//! Keeps Helm charts, Kustomize resources, pre-commit hooks and frozen
//! Python dependencies current, publishing the changes as one pull request
//! per repository.
pub mod analysis;
pub mod cli;
pub mod command;
pub mod config;
pub mod dependency;
pub mod error;
pub mod factory;
pub mod forge;
pub mod inventory;
pub mod pr;
pub mod processor;
pub mod repo;
pub mod result;
pub mod scanner;
pub mod update;
pub mod version;
pub mod virtualenv;

pub use error::{FreshenError, Result};
