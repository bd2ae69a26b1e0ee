//! fetch command - Fetch a network resource into a bucket
//!
//! The storage service downloads the URL itself. Without `--dst` the service
//! names the object after its content hash.

use clap::Args;
use qn_core::BucketOps;

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Fetch a network resource into a bucket
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Network resource URL
    pub url: String,

    /// Remote key (default: the content hash)
    #[arg(short, long)]
    pub dst: Option<String>,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

/// Execute the fetch command
pub async fn execute(args: FetchArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let bucket = args.bucket.as_deref().unwrap_or_default();
    let outcome = ops.fetch(&args.url, args.dst.as_deref(), bucket).await;
    report(&outcome, formatter)
}
