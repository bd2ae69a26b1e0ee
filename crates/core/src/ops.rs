//! Bucket operations facade
//!
//! One method per domain verb. Every method resolves the effective bucket,
//! makes at most one gateway call and returns an [`Outcome`]. Remote failures
//! are logged and reported through the outcome, never as errors.

use std::path::Path;
use std::sync::Arc;

use jiff::tz::TimeZone;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{Instrument as _, Span};

use crate::bucket::{BucketConfig, BucketRegistry};
use crate::config::Config;
use crate::error::Result;
use crate::format::{format_time, readable_size};
use crate::path::{ObjectRef, default_remote_key, url_for};
use crate::traits::{ListOptions, ListingPage, RemoteError, StorageClass, StorageGateway};

/// Page size used when the caller does not ask for one
pub const DEFAULT_LIST_LIMIT: usize = 30;

/// Largest page the listing endpoint serves
pub const MAX_LIST_LIMIT: usize = 1000;

/// Status reported when a batch succeeded for some keys only
pub const PARTIAL_SUCCESS_STATUS: u16 = 298;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LIST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Why an operation did not succeed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// The storage service or the transport reported an error
    Remote(RemoteError),
    /// The request was rejected before any remote call was made
    Invalid { message: String },
}

impl Failure {
    /// Status code of a remote failure
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Failure::Remote(err) => Some(err.status_code),
            Failure::Invalid { .. } => None,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Remote(err) => write!(f, "{err}"),
            Failure::Invalid { message } => f.write_str(message),
        }
    }
}

/// Result of one facade call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Operation name, as used in failure messages
    pub operation: &'static str,

    /// Whether the operation succeeded
    pub success: bool,

    /// Human-readable result (or failure summary)
    pub message: String,

    /// Structured result for machine-readable output
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,

    /// Failure cause, when not successful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl Outcome {
    pub fn ok(operation: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self {
            operation,
            success: true,
            message: message.into(),
            details,
            failure: None,
        }
    }

    pub fn failed(operation: &'static str, failure: Failure) -> Self {
        Self {
            operation,
            success: false,
            message: format!("{operation} failed: {failure}"),
            details: Value::Null,
            failure: Some(failure),
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// How much detail `list` renders per object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListStyle {
    /// Size, MIME, time and key
    #[default]
    Short,
    /// Additionally the content hash and storage class
    Long,
}

/// Bucket operations facade
pub struct BucketOps {
    gateway: Arc<dyn StorageGateway>,
    registry: BucketRegistry,
    time_zone: TimeZone,
    span: Span,
}

impl std::fmt::Debug for BucketOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketOps")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl BucketOps {
    /// Create the facade from a loaded configuration
    ///
    /// Fails if the configuration has no usable credentials.
    pub fn new(config: &Config, gateway: Arc<dyn StorageGateway>) -> Result<Self> {
        config.credentials()?;
        Ok(Self {
            gateway,
            registry: config.registry(),
            time_zone: TimeZone::system(),
            span: Span::current(),
        })
    }

    /// Parent span for every operation's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Time zone used to render upload times
    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn registry(&self) -> &BucketRegistry {
        &self.registry
    }

    /// Effective bucket name: the given one, or the default bucket's
    fn bucket_name<'a>(&'a self, name: &'a str) -> &'a str {
        if name.is_empty() {
            &self.registry.default_bucket().name
        } else {
            name
        }
    }

    /// Bucket policy used to build URLs
    fn policy(&self, name: &str) -> &BucketConfig {
        self.registry.resolve(name)
    }

    fn span(&self, operation: &'static str) -> Span {
        tracing::info_span!(parent: &self.span, "bucket_op", operation)
    }

    fn remote_failure(&self, operation: &'static str, err: RemoteError) -> Outcome {
        tracing::error!("{} failed: {}", operation, err);
        tracing::debug!("{} failed, info: {:?}", operation, err);
        Outcome::failed(operation, Failure::Remote(err))
    }

    fn invalid(&self, operation: &'static str, message: impl Into<String>) -> Outcome {
        let failure = Failure::Invalid {
            message: message.into(),
        };
        tracing::error!("{} failed: {}", operation, failure);
        Outcome::failed(operation, failure)
    }

    /// User-facing URL of an object, signed for private buckets
    pub fn url_for(&self, key: &str, bucket: &str) -> String {
        url_for(self.gateway.as_ref(), self.policy(bucket), key)
    }

    /// Resolve the URL of an object without contacting the service
    pub fn url(&self, key: &str, bucket: &str) -> Outcome {
        const OP: &str = "url";
        let _entered = self.span(OP).entered();

        if key.is_empty() {
            return self.invalid(OP, "object key is empty");
        }
        let bucket = self.bucket_name(bucket);
        let url = self.url_for(key, bucket);
        Outcome::ok(OP, url.clone(), json!({ "bucket": bucket, "key": key, "url": url }))
    }

    /// Show metadata of one object
    pub async fn stat(&self, key: &str, bucket: &str) -> Outcome {
        const OP: &str = "stat";
        async {
            let target = ObjectRef::new(self.bucket_name(bucket), key);
            let metadata = match self.gateway.stat(&target.bucket, key).await {
                Ok(metadata) => metadata,
                Err(err) => return self.remote_failure(OP, err),
            };
            tracing::debug!("stat ret: {:?}", metadata);

            let url = self.url_for(key, &target.bucket);
            let report = [
                format!("PATH: {key}"),
                format!(" URL: {url}"),
                format!("SIZE: {} bytes", metadata.size),
                format!(
                    "TYPE: {}({})",
                    metadata.storage_class.code(),
                    metadata.storage_class.label()
                ),
                format!(
                    "TIME: {}",
                    format_time(metadata.upload_time, &self.time_zone, TIME_FORMAT)
                ),
                format!("MIME: {}", metadata.mime_type),
                format!("HASH: {}", metadata.content_hash),
            ]
            .join("\n");
            tracing::info!("stat result of {}:\n{}", target, report);

            let details = json!({
                "bucket": target.bucket,
                "key": key,
                "url": url,
                "metadata": metadata,
            });
            Outcome::ok(OP, report, details)
        }
        .instrument(self.span(OP))
        .await
    }

    /// List one page of objects
    ///
    /// When more pages remain, the rendered output ends with the marker to
    /// pass back to continue the listing.
    pub async fn list(&self, bucket: &str, options: ListOptions, style: ListStyle) -> Outcome {
        const OP: &str = "list";
        async {
            let bucket = self.bucket_name(bucket);
            let options = ListOptions {
                limit: match options.limit {
                    0 => DEFAULT_LIST_LIMIT,
                    limit => limit.min(MAX_LIST_LIMIT),
                },
                ..options
            };

            let page = match self.gateway.list(bucket, options).await {
                Ok(page) => page,
                Err(err) => return self.remote_failure(OP, err),
            };
            tracing::debug!("list ret: {:?}", page);

            let more = if page.end_of_listing { "" } else { "+" };
            let header = format!("[{}] matched {}{} item(s):", bucket, page.items.len(), more);
            tracing::info!("{}", header);

            let mut lines = vec![header];
            lines.extend(self.render_page(&page, style));
            if !page.end_of_listing {
                lines.push(format!(
                    "...Use --marker \"{}\" to see the rest results",
                    page.next_marker
                ));
            }

            Outcome::ok(OP, lines.join("\n"), json!({ "bucket": bucket, "page": page }))
        }
        .instrument(self.span(OP))
        .await
    }

    fn render_page(&self, page: &ListingPage, style: ListStyle) -> Vec<String> {
        let dirs = page
            .common_prefixes
            .iter()
            .map(|prefix| format!("{:>10} {:<17} {:<16}  {}", "-", "<DIR>", "", prefix));

        let objects = page.items.iter().map(|item| {
            let size = readable_size(item.size);
            let mime = item.mime_type.as_deref().unwrap_or("N/A");
            let time = format_time(item.upload_time, &self.time_zone, LIST_TIME_FORMAT);
            match style {
                ListStyle::Short => format!("{size:>10} {mime:<17} {time}  {}", item.key),
                ListStyle::Long => {
                    let hash = item.hash.as_deref().unwrap_or("-");
                    let class = item.storage_class.map_or("-", StorageClass::label);
                    format!(
                        "{size:>10} {mime:<17} {time}  {hash:<28} {class:<13} {}",
                        item.key
                    )
                }
            }
        });

        dirs.chain(objects).collect()
    }

    /// Move (rename) an object; the destination bucket defaults to the source bucket
    pub async fn move_object(
        &self,
        src: &str,
        dst: &str,
        src_bucket: &str,
        dst_bucket: &str,
    ) -> Outcome {
        const OP: &str = "move";
        async {
            let (from, to) = self.transfer_refs(src, dst, src_bucket, dst_bucket);
            match self
                .gateway
                .move_object(&from.bucket, &from.key, &to.bucket, &to.key)
                .await
            {
                Ok(()) => {
                    let message = format!("moved {from} to {to}");
                    tracing::info!("{}", message);
                    Outcome::ok(OP, message, transfer_details(&from, &to))
                }
                Err(err) => self.remote_failure(OP, err),
            }
        }
        .instrument(self.span(OP))
        .await
    }

    /// Copy an object; the destination bucket defaults to the source bucket
    pub async fn copy_object(
        &self,
        src: &str,
        dst: &str,
        src_bucket: &str,
        dst_bucket: &str,
    ) -> Outcome {
        const OP: &str = "copy";
        async {
            let (from, to) = self.transfer_refs(src, dst, src_bucket, dst_bucket);
            match self
                .gateway
                .copy_object(&from.bucket, &from.key, &to.bucket, &to.key)
                .await
            {
                Ok(()) => {
                    let message = format!("copied {from} to {to}");
                    tracing::info!("{}", message);
                    Outcome::ok(OP, message, transfer_details(&from, &to))
                }
                Err(err) => self.remote_failure(OP, err),
            }
        }
        .instrument(self.span(OP))
        .await
    }

    fn transfer_refs(
        &self,
        src: &str,
        dst: &str,
        src_bucket: &str,
        dst_bucket: &str,
    ) -> (ObjectRef, ObjectRef) {
        let src_bucket = self.bucket_name(src_bucket);
        let dst_bucket = if dst_bucket.is_empty() {
            src_bucket
        } else {
            dst_bucket
        };
        (
            ObjectRef::new(src_bucket, src),
            ObjectRef::new(dst_bucket, dst),
        )
    }

    /// Delete one object
    pub async fn remove_one(&self, key: &str, bucket: &str) -> Outcome {
        const OP: &str = "remove";
        async {
            let target = ObjectRef::new(self.bucket_name(bucket), key);
            match self.gateway.delete(&target.bucket, key).await {
                Ok(()) => {
                    let message = format!("deleted {target}");
                    tracing::info!("{}", message);
                    Outcome::ok(
                        OP,
                        message,
                        json!({ "bucket": target.bucket, "deleted": [key] }),
                    )
                }
                Err(err) => self.remote_failure(OP, err),
            }
        }
        .instrument(self.span(OP))
        .await
    }

    /// Delete several objects with a single batch request
    ///
    /// An empty key list is rejected without contacting the service. The
    /// outcome is successful only if every key was deleted.
    pub async fn remove_many(&self, keys: &[String], bucket: &str) -> Outcome {
        const OP: &str = "remove";
        async {
            if keys.is_empty() {
                return self.invalid(OP, "no keys given");
            }

            let bucket = self.bucket_name(bucket);
            let outcome = match self.gateway.batch_delete(bucket, keys).await {
                Ok(outcome) => outcome,
                Err(err) => return self.remote_failure(OP, err),
            };
            tracing::debug!("batch ret: {:?}", outcome);

            let details = json!({ "bucket": bucket, "results": outcome.items });
            if outcome.all_ok() {
                let message = format!("deleted [{}] {}", bucket, keys.join(", "));
                tracing::info!("{}", message);
                return Outcome::ok(OP, message, details);
            }

            let failed: Vec<_> = outcome.failed().collect();
            let status_code = if failed.len() == outcome.items.len() {
                failed[0].status_code
            } else {
                PARTIAL_SUCCESS_STATUS
            };
            let summary = failed
                .iter()
                .map(|item| match &item.error {
                    Some(error) => format!("{} ({} {})", item.key, item.status_code, error),
                    None => format!("{} ({})", item.key, item.status_code),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let err = RemoteError::new(
                status_code,
                format!("{} of {} key(s) not deleted: {}", failed.len(), keys.len(), summary),
            );
            self.remote_failure(OP, err).with_details(details)
        }
        .instrument(self.span(OP))
        .await
    }

    /// Upload a local file
    ///
    /// The remote key defaults to the local file's base name.
    pub async fn upload(&self, local_path: &Path, remote_key: &str, bucket: &str) -> Outcome {
        const OP: &str = "upload";
        async {
            let key = if remote_key.is_empty() {
                match default_remote_key(local_path) {
                    Some(key) => key,
                    None => {
                        return self.invalid(
                            OP,
                            format!("cannot derive a key from {}", local_path.display()),
                        );
                    }
                }
            } else {
                remote_key.to_string()
            };

            let size = match tokio::fs::metadata(local_path).await {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => {
                    return self.invalid(OP, format!("{} is not a file", local_path.display()));
                }
                Err(e) => {
                    return self.invalid(
                        OP,
                        format!("cannot read {}: {}", local_path.display(), e),
                    );
                }
            };

            let bucket = self.bucket_name(bucket);
            tracing::info!("Uploading \"{}\" to bucket \"{}\".", key, bucket);
            let credential = self.gateway.sign_upload(bucket, &key);
            let result = match self.gateway.upload(&credential, &key, local_path).await {
                Ok(result) => result,
                Err(err) => return self.remote_failure(OP, err),
            };
            tracing::debug!("Upload ret: {:?}", result);

            let url = self.url_for(&result.key, bucket);
            let message = format!("Upload done. url is {url}");
            tracing::info!("{}", message);
            let details = json!({
                "bucket": bucket,
                "key": result.key,
                "hash": result.hash,
                "size": size,
                "url": url,
            });
            Outcome::ok(OP, message, details)
        }
        .instrument(self.span(OP))
        .await
    }

    /// Have the service fetch a remote URL into the bucket
    ///
    /// Without a key the service assigns one.
    pub async fn fetch(&self, url: &str, remote_key: Option<&str>, bucket: &str) -> Outcome {
        const OP: &str = "fetch";
        async {
            match url::Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => {
                    return self.invalid(
                        OP,
                        format!("unsupported URL scheme '{}'", parsed.scheme()),
                    );
                }
                Err(e) => return self.invalid(OP, format!("invalid URL '{url}': {e}")),
            }

            let bucket = self.bucket_name(bucket);
            let key = remote_key.filter(|k| !k.is_empty()).map(str::to_string);
            tracing::debug!("Fetching from {} to [{}] {:?}", url, bucket, key);

            match self.gateway.fetch(url, bucket, key).await {
                Ok(result) => {
                    let message = format!(
                        "Fetch success to [{}] {} ({}).",
                        bucket, result.key, result.mime_type
                    );
                    tracing::info!("{}", message);
                    Outcome::ok(OP, message, json!({ "bucket": bucket, "result": result }))
                }
                Err(err) => self.remote_failure(OP, err),
            }
        }
        .instrument(self.span(OP))
        .await
    }

    /// Change the MIME type of an object
    pub async fn change_mime(&self, key: &str, mime: &str, bucket: &str) -> Outcome {
        const OP: &str = "change_mime";
        async {
            if mime.trim().is_empty() {
                return self.invalid(OP, "MIME type is empty");
            }

            let target = ObjectRef::new(self.bucket_name(bucket), key);
            match self.gateway.set_mime(&target.bucket, key, mime).await {
                Ok(()) => {
                    let message = format!("Change {target} mime to {mime}");
                    tracing::info!("{}", message);
                    Outcome::ok(
                        OP,
                        message,
                        json!({ "bucket": target.bucket, "key": key, "mime_type": mime }),
                    )
                }
                Err(err) => self.remote_failure(OP, err),
            }
        }
        .instrument(self.span(OP))
        .await
    }

    /// Change the storage class of an object
    pub async fn change_type(&self, key: &str, class: StorageClass, bucket: &str) -> Outcome {
        const OP: &str = "change_type";
        async {
            let target = ObjectRef::new(self.bucket_name(bucket), key);
            match self
                .gateway
                .set_storage_class(&target.bucket, key, class)
                .await
            {
                Ok(()) => {
                    let message = format!("Change {target} type to {}", class.code());
                    tracing::info!("{}", message);
                    Outcome::ok(
                        OP,
                        message,
                        json!({ "bucket": target.bucket, "key": key, "storage_class": class }),
                    )
                }
                Err(err) => self.remote_failure(OP, err),
            }
        }
        .instrument(self.span(OP))
        .await
    }
}

fn transfer_details(from: &ObjectRef, to: &ObjectRef) -> Value {
    json!({
        "src_bucket": from.bucket,
        "src": from.key,
        "dst_bucket": to.bucket,
        "dst": to.key,
    })
}
