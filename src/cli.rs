//! CLI argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Configuration file. Defaults to freshen.toml when present.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report the updates a checkout needs.
    Analyze {
        #[arg(long, default_value = ".")]
        /// Root of the checkout.
        path: PathBuf,

        #[arg(long, default_value_t = false)]
        /// Treat non-exact Helm versions as version ranges.
        allow_expressions: bool,

        #[arg(long, default_value_t = false, conflicts_with = "update")]
        /// Apply updates on the tool branch and open a pull request.
        pr: bool,

        #[arg(long, default_value_t = false)]
        /// Apply updates to the working tree.
        update: bool,
    },

    /// Update every configured repository.
    Process,

    /// List the dependencies declared in a tree.
    Scan {
        #[arg(long, default_value = ".")]
        /// Root of the tree to scan.
        path: PathBuf,
    },

    /// Show the latest tag of a GitHub repository.
    GithubInventory {
        owner: String,
        repo: String,

        #[arg(long, default_value_t = false)]
        /// Only consider strict semantic versions.
        semantic: bool,
    },

    /// Show the latest version of each chart in a Helm repository.
    HelmInventory { url: String },
}
