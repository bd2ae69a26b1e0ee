//! upload command - Upload a local file
//!
//! The file is streamed in a single request. The remote key defaults to the
//! local file name.

use std::path::PathBuf;

use clap::Args;
use qn_core::{BucketOps, Outcome};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

/// Upload a local file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file path
    pub file: PathBuf,

    /// Remote key (default: the local file name)
    #[arg(short, long)]
    pub dest: Option<String>,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let bucket = args.bucket.as_deref().unwrap_or_default();
    let dest = args.dest.as_deref().unwrap_or_default();

    let spinner = Spinner::new(
        formatter.config(),
        &format!("Uploading {}", args.file.display()),
    );
    let outcome = ops.upload(&args.file, dest, bucket).await;
    spinner.finish_and_clear();

    let code = report(&outcome, formatter);
    if let Some(summary) = size_summary(&outcome)
        && !formatter.is_json()
    {
        formatter.println(&summary);
    }
    code
}

fn size_summary(outcome: &Outcome) -> Option<String> {
    if !outcome.success {
        return None;
    }
    let size = outcome.details["size"].as_u64()?;
    Some(format!(
        "{} uploaded",
        humansize::format_size(size, humansize::BINARY)
    ))
}
