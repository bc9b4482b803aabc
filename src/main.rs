use clap::Parser;
use color_eyre::eyre::WrapErr;

use freshen::{
    cli::{Args, Command},
    command::{self, analyze::Mode},
    config::Config,
    result::Result,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("freshen")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = Config::load(cli_args.config.as_deref())
        .wrap_err("unable to load configuration")?;

    match cli_args.command {
        Command::Analyze {
            path,
            allow_expressions,
            pr,
            update,
        } => {
            command::analyze::execute(
                config,
                &path,
                allow_expressions,
                Mode::from_flags(pr, update),
            )
            .await
        }
        Command::Process => command::process::execute(config).await,
        Command::Scan { path } => command::scan::execute(&path),
        Command::GithubInventory {
            owner,
            repo,
            semantic,
        } => {
            command::inventory::execute_github(config, &owner, &repo, semantic)
                .await
        }
        Command::HelmInventory { url } => {
            command::inventory::execute_helm(config, &url).await
        }
    }
}
