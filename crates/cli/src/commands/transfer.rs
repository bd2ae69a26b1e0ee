//! mv and cp commands - Move or copy a remote file
//!
//! Both run server-side. The destination bucket defaults to the source
//! bucket, which defaults to the configured default bucket.

use clap::Args;
use qn_core::BucketOps;

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Arguments shared by mv and cp
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Source key
    pub src: String,

    /// Destination key
    pub dst: String,

    /// Bucket holding the source file
    #[arg(long)]
    pub src_bucket: Option<String>,

    /// Bucket receiving the destination file (default: the source bucket)
    #[arg(long)]
    pub dst_bucket: Option<String>,
}

impl TransferArgs {
    fn buckets(&self) -> (&str, &str) {
        (
            self.src_bucket.as_deref().unwrap_or_default(),
            self.dst_bucket.as_deref().unwrap_or_default(),
        )
    }
}

/// Execute the mv command
pub async fn execute_move(args: TransferArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let (src_bucket, dst_bucket) = args.buckets();
    let outcome = ops
        .move_object(&args.src, &args.dst, src_bucket, dst_bucket)
        .await;
    report(&outcome, formatter)
}

/// Execute the cp command
pub async fn execute_copy(args: TransferArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let (src_bucket, dst_bucket) = args.buckets();
    let outcome = ops
        .copy_object(&args.src, &args.dst, src_bucket, dst_bucket)
        .await;
    report(&outcome, formatter)
}
