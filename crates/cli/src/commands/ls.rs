//! ls command - List remote files
//!
//! Lists one page of objects. When more remain, the output ends with the
//! marker to pass to `--marker` for the next page.

use clap::Args;
use qn_core::ops::DEFAULT_LIST_LIMIT;
use qn_core::{BucketOps, ListOptions, ListStyle};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List remote files
#[derive(Args, Debug)]
pub struct LsArgs {
    /// List files whose key starts with this prefix
    pub prefix: Option<String>,

    /// Use a long listing format (adds hash and storage type)
    #[arg(short = 'l')]
    pub long: bool,

    /// Max files to list
    #[arg(short, long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub max: usize,

    /// Group keys sharing a prefix up to this delimiter
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Continue a previous listing from this marker
    #[arg(long)]
    pub marker: Option<String>,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

impl LsArgs {
    fn options(&self) -> ListOptions {
        ListOptions {
            prefix: self.prefix.clone(),
            marker: self.marker.clone(),
            limit: self.max,
            delimiter: self.delimiter.clone(),
        }
    }

    fn style(&self) -> ListStyle {
        if self.long {
            ListStyle::Long
        } else {
            ListStyle::Short
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let bucket = args.bucket.as_deref().unwrap_or_default();
    let outcome = ops.list(bucket, args.options(), args.style()).await;
    report(&outcome, formatter)
}
