//! stat command - Show detail of a remote file

use clap::Args;
use qn_core::BucketOps;

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Show detail of a remote file
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Remote key with full path
    pub file: String,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let bucket = args.bucket.as_deref().unwrap_or_default();
    let outcome = ops.stat(&args.file, bucket).await;
    report(&outcome, formatter)
}
