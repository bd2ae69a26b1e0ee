//! url command - Print the URL of a remote file
//!
//! Private buckets get a URL signed for one hour. No request is sent.

use clap::Args;
use qn_core::BucketOps;

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Print the public or signed URL of a remote file
#[derive(Args, Debug)]
pub struct UrlArgs {
    /// Remote key with full path
    pub file: String,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

/// Execute the url command
pub fn execute(args: UrlArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let bucket = args.bucket.as_deref().unwrap_or_default();
    report(&ops.url(&args.file, bucket), formatter)
}
