//! buckets command - List configured buckets
//!
//! Reads the registry only; no request is sent.

use comfy_table::{ContentArrangement, Table, presets};
use qn_core::{BucketConfig, BucketOps};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct BucketOutput<'a> {
    name: &'a str,
    access: &'static str,
    url: String,
    default: bool,
}

impl<'a> BucketOutput<'a> {
    fn new(bucket: &'a BucketConfig, default_name: &str) -> Self {
        Self {
            name: &bucket.name,
            access: bucket.access_label(),
            url: format!("{}://{}", bucket.protocol, bucket.domain),
            default: bucket.name == default_name,
        }
    }
}

/// Execute the buckets command
pub fn execute(ops: &BucketOps, formatter: &Formatter) -> ExitCode {
    let registry = ops.registry();
    let default_name = &registry.default_bucket().name;
    let rows: Vec<_> = registry
        .buckets()
        .iter()
        .map(|bucket| BucketOutput::new(bucket, default_name))
        .collect();

    if formatter.is_json() {
        formatter.json(&rows);
        return ExitCode::Success;
    }

    if registry.is_empty() {
        formatter.warning("No buckets configured");
        return ExitCode::Success;
    }

    formatter.println(&render_table(&rows).to_string());
    ExitCode::Success
}

fn render_table(rows: &[BucketOutput<'_>]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["NAME", "ACCESS", "URL", ""]);
    for row in rows {
        table.add_row(vec![
            row.name.to_string(),
            row.access.to_string(),
            row.url.clone(),
            if row.default { "(default)" } else { "" }.to_string(),
        ]);
    }
    table
}
