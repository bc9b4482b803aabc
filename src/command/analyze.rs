//! `analyze` command implementation.
use color_eyre::eyre::WrapErr;
use log::*;
use std::path::Path;

use crate::{
    command::print_yaml,
    config::Config,
    factory::Factory,
    processor::{Processor, analyze_checkout, update_checkout},
    result::Result,
};

/// What `analyze` does with the updates it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report only. The tree is left untouched.
    Report,
    /// Apply updates to the working tree.
    Update,
    /// Apply updates on the tool branch and open a pull request.
    PullRequest,
}

impl Mode {
    pub fn from_flags(pr: bool, update: bool) -> Self {
        match (pr, update) {
            (true, _) => Mode::PullRequest,
            (false, true) => Mode::Update,
            (false, false) => Mode::Report,
        }
    }
}

/// Execute `analyze` against the checkout at `path`.
pub async fn execute(
    mut config: Config,
    path: &Path,
    allow_expressions: bool,
    mode: Mode,
) -> Result<()> {
    config.allow_expressions |= allow_expressions;

    let factory = Factory::new(config);
    let analyzers = factory.create_all_analyzers()?;

    match mode {
        Mode::Report => {
            let results =
                analyze_checkout(&analyzers, path).await.wrap_err_with(|| {
                    format!("analyzing {} failed", path.display())
                })?;
            print_yaml(&results)
        }
        Mode::Update => {
            let updates =
                update_checkout(&analyzers, path).await.wrap_err_with(|| {
                    format!("updating {} failed", path.display())
                })?;
            info!("applied {} updates", updates.len());
            print_yaml(&updates)
        }
        Mode::PullRequest => {
            let pull_requester = factory.create_pull_requester()?;
            let config = factory.config();
            let processor = Processor::new(
                analyzers,
                pull_requester,
                config.branch.clone(),
                config.work_area.clone(),
            );

            let updates =
                processor.process_checkout(path).await.wrap_err_with(|| {
                    format!("processing {} failed", path.display())
                })?;
            print_yaml(&updates)
        }
    }
}
