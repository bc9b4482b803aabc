//! `process` command implementation.
use color_eyre::eyre::{WrapErr, eyre};
use log::*;

use crate::{
    config::Config, factory::Factory, processor::Processor, result::Result,
};

/// Run an update cycle on every configured repository.
pub async fn execute(config: Config) -> Result<()> {
    if config.repositories.is_empty() {
        return Err(eyre!("no repositories configured"));
    }

    let repositories = config.repositories.clone();
    let factory = Factory::new(config);

    let processor = Processor::new(
        factory.create_all_analyzers()?,
        factory.create_pull_requester()?,
        factory.config().branch.clone(),
        factory.config().work_area.clone(),
    );

    info!("processing {} repositories", repositories.len());

    processor
        .process(&repositories)
        .await
        .wrap_err("processing repositories failed")
}
