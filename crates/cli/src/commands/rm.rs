//! rm command - Remove remote files
//!
//! One key is deleted with a single delete request; several keys go out in
//! one batch request.

use clap::Args;
use qn_core::BucketOps;

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove remote files
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Remote keys with full path
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let bucket = args.bucket.as_deref().unwrap_or_default();
    let outcome = match args.files.as_slice() {
        [key] => ops.remove_one(key, bucket).await,
        keys => ops.remove_many(keys, bucket).await,
    };
    report(&outcome, formatter)
}
