//! qncli - Kodo object storage client
//!
//! A command-line interface for managing objects in Kodo buckets.

use clap::Parser;

use qncli::commands::{self, Cli};
use qncli::exit_code::ExitCode;
use qncli::logging::Logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let logging = Logging::init(cli.debug);

    let exit_code = tokio::select! {
        code = commands::execute(cli, &logging) => code,
        _ = tokio::signal::ctrl_c() => ExitCode::Interrupted,
    };

    std::process::exit(exit_code.as_i32());
}
