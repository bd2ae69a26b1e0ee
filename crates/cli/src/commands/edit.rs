//! edit command - Change the storage type and/or MIME type of a remote file
//!
//! The storage type is changed first, then the MIME type. Both steps run
//! even if the first fails; the command fails if either does.

use clap::Args;
use qn_core::{BucketOps, StorageClass};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Change the storage type and/or MIME type of a remote file
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Remote key with full path
    pub file: String,

    /// Storage type. 0: standard, 1: low frequency
    #[arg(short = 't', long = "type", value_parser = clap::value_parser!(i64).range(0..=1))]
    pub storage_type: Option<i64>,

    /// MIME type
    #[arg(short, long)]
    pub mime: Option<String>,

    /// Remote bucket name (default: the configured default bucket)
    #[arg(short, long)]
    pub bucket: Option<String>,
}

/// Execute the edit command
pub async fn execute(args: EditArgs, ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    if args.storage_type.is_none() && args.mime.is_none() {
        formatter.error("Nothing to change: give --type and/or --mime");
        return ExitCode::UsageError;
    }

    let bucket = args.bucket.as_deref().unwrap_or_default();
    let mut outcomes = Vec::new();
    if let Some(code) = args.storage_type {
        outcomes.push(
            ops.change_type(&args.file, StorageClass::from_code(code), bucket)
                .await,
        );
    }
    if let Some(mime) = &args.mime {
        outcomes.push(ops.change_mime(&args.file, mime, bucket).await);
    }

    if formatter.is_json() {
        formatter.json(&outcomes);
    } else {
        for outcome in &outcomes {
            formatter.outcome(outcome);
        }
    }

    outcomes
        .iter()
        .map(ExitCode::from_outcome)
        .find(|code| *code != ExitCode::Success)
        .unwrap_or(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: EditArgs,
    }

    #[test]
    fn test_type_and_mime() {
        let args = TestCli::parse_from(["edit", "index.html", "-t", "1", "-m", "text/html"]).args;
        assert_eq!(args.storage_type, Some(1));
        assert_eq!(args.mime.as_deref(), Some("text/html"));
    }

    #[test]
    fn test_type_out_of_range_is_rejected() {
        assert!(TestCli::try_parse_from(["edit", "index.html", "-t", "2"]).is_err());
    }
}
