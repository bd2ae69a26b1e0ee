//! CLI command definitions and execution
//!
//! Each subcommand maps onto one facade call. Commands receive the facade and
//! a formatter and return the process exit code.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use qn_core::{BucketOps, ConfigManager, Outcome};
use qn_kodo::KodoClient;

use crate::exit_code::ExitCode;
use crate::logging::Logging;
use crate::output::{Formatter, OutputConfig};

mod buckets;
pub mod completions;
mod edit;
mod fetch;
mod ls;
mod rm;
mod stat;
mod transfer;
mod upload;
mod url;

/// qncli - Kodo object storage client
///
/// List, inspect, copy, move, delete, upload and fetch objects in the
/// buckets named in the configuration file.
#[derive(Parser, Debug)]
#[command(name = "qncli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "QNCLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable the upload spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured buckets
    Buckets,

    /// List remote files
    Ls(ls::LsArgs),

    /// Show detail of a remote file
    Stat(stat::StatArgs),

    /// Move (rename) a file
    Mv(transfer::TransferArgs),

    /// Copy a file
    Cp(transfer::TransferArgs),

    /// Remove files from a bucket
    Rm(rm::RmArgs),

    /// Upload a local file
    Upload(upload::UploadArgs),

    /// Fetch a network resource into a bucket
    Fetch(fetch::FetchArgs),

    /// Change the MIME type and/or storage type of a file
    Edit(edit::EditArgs),

    /// Print the public or signed URL of a file
    Url(url::UrlArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

impl Commands {
    /// Subcommand name, recorded on the command span
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Buckets => "buckets",
            Commands::Ls(_) => "ls",
            Commands::Stat(_) => "stat",
            Commands::Mv(_) => "mv",
            Commands::Cp(_) => "cp",
            Commands::Rm(_) => "rm",
            Commands::Upload(_) => "upload",
            Commands::Fetch(_) => "fetch",
            Commands::Edit(_) => "edit",
            Commands::Url(_) => "url",
            Commands::Completions(_) => "completions",
        }
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli, logging: &Logging) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };
    let formatter = Formatter::new(output_config);

    if let Commands::Completions(args) = &cli.command {
        return completions::execute(args);
    }

    let ops = match open(cli.config.as_deref(), logging) {
        Ok(ops) => ops,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };
    let ops = ops.with_span(tracing::info_span!("qncli", command = cli.command.name()));

    match cli.command {
        Commands::Buckets => buckets::execute(&ops, &formatter),
        Commands::Ls(args) => ls::execute(args, &ops, &formatter).await,
        Commands::Stat(args) => stat::execute(args, &ops, &formatter).await,
        Commands::Mv(args) => transfer::execute_move(args, &ops, &formatter).await,
        Commands::Cp(args) => transfer::execute_copy(args, &ops, &formatter).await,
        Commands::Rm(args) => rm::execute(args, &ops, &formatter).await,
        Commands::Upload(args) => upload::execute(args, &ops, &formatter).await,
        Commands::Fetch(args) => fetch::execute(args, &ops, &formatter).await,
        Commands::Edit(args) => edit::execute(args, &ops, &formatter).await,
        Commands::Url(args) => url::execute(args, &ops, &formatter),
        Commands::Completions(args) => completions::execute(&args),
    }
}

/// Load the configuration and build the facade over the Kodo client
fn open(config_path: Option<&Path>, logging: &Logging) -> qn_core::Result<BucketOps> {
    let manager = match config_path {
        Some(path) => ConfigManager::with_path(path.to_path_buf()),
        None => ConfigManager::new()?,
    };
    let config = manager.load()?;
    logging.apply_config_level(config.log_level()?);
    let client = KodoClient::new(&config)?;
    BucketOps::new(&config, Arc::new(client))
}

/// Print an outcome and map it to an exit code
fn report(outcome: &Outcome, formatter: &Formatter) -> ExitCode {
    formatter.outcome(outcome);
    ExitCode::from_outcome(outcome)
}
