//! StorageGateway trait definition
//!
//! This trait defines the authenticated remote operations the facade relies on.
//! It allows the bucket operations to be decoupled from the HTTP adapter and
//! mocked in tests.

use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;

/// Number of 100-nanosecond ticks per second in upload timestamps
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Convert 100-nanosecond ticks since the Unix epoch to a timestamp
pub fn ticks_to_timestamp(ticks: i64) -> Option<Timestamp> {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * 100;
    Timestamp::new(seconds, nanos as i32).ok()
}

/// Per-object storage tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i64")]
pub enum StorageClass {
    Standard,
    LowFrequency,
    /// A tier this client does not know about
    Other(i64),
}

impl StorageClass {
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => StorageClass::Standard,
            1 => StorageClass::LowFrequency,
            other => StorageClass::Other(other),
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            StorageClass::Standard => 0,
            StorageClass::LowFrequency => 1,
            StorageClass::Other(code) => code,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StorageClass::Standard => "standard",
            StorageClass::LowFrequency => "low frequency",
            StorageClass::Other(_) => "unknown",
        }
    }
}

impl From<StorageClass> for i64 {
    fn from(class: StorageClass) -> Self {
        class.code()
    }
}

/// Failure reported by the storage service (or by the transport, with status 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteError {
    /// HTTP status or service error code; 0 when no response was received
    pub status_code: u16,

    /// Error message from the service
    pub message: String,

    /// Raw response body, when one was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RemoteError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            raw: None,
        }
    }

    /// Failure that happened before any response was received
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}){}", self.status_code, self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Result type for gateway calls
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Metadata returned by `stat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectMetadata {
    /// Size in bytes
    pub size: u64,

    /// Storage tier
    pub storage_class: StorageClass,

    /// Upload time
    pub upload_time: Timestamp,

    /// MIME type
    pub mime_type: String,

    /// Content hash (etag)
    pub content_hash: String,
}

/// One entry of a listing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedObject {
    /// Object key
    pub key: String,

    /// MIME type, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Size in bytes, -1 when not reported
    pub size: i64,

    /// Upload time
    pub upload_time: Timestamp,

    /// Content hash, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Storage tier, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
}

impl ListedObject {
    /// Create an entry with only key, size and time known
    pub fn new(key: impl Into<String>, size: i64, upload_time: Timestamp) -> Self {
        Self {
            key: key.into(),
            mime_type: None,
            size,
            upload_time,
            hash: None,
            storage_class: None,
        }
    }
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Prefix to filter by
    pub prefix: Option<String>,

    /// Cursor returned by the previous page
    pub marker: Option<String>,

    /// Maximum number of items per page
    pub limit: usize,

    /// Delimiter for grouping (usually "/")
    pub delimiter: Option<String>,
}

/// One page of a resumable listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingPage {
    /// Objects on this page
    pub items: Vec<ListedObject>,

    /// Common prefixes (when a delimiter was given)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_prefixes: Vec<String>,

    /// Opaque cursor to pass back unchanged for the next page
    pub next_marker: String,

    /// Whether this is the last page
    pub end_of_listing: bool,
}

/// Per-key result of a batch delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub key: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn ok(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status_code: 200,
            error: None,
        }
    }

    pub fn failed(key: impl Into<String>, status_code: u16, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status_code,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Result of a batch delete, one item per requested key in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub items: Vec<BatchItem>,
}

impl BatchOutcome {
    pub fn all_ok(&self) -> bool {
        self.items.iter().all(BatchItem::is_ok)
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|item| !item.is_ok())
    }
}

/// Short-lived credential allowing one upload to (bucket, key)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredential {
    pub bucket: String,
    pub key: String,
    pub token: String,
}

/// Result of an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub key: String,
    pub hash: String,
}

/// Result of a server-side fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub key: String,
    pub hash: String,
    pub mime_type: String,
    pub size: u64,
}

/// Trait for authenticated storage operations
///
/// This trait is implemented by the Kodo HTTP adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Get object metadata
    async fn stat(&self, bucket: &str, key: &str) -> RemoteResult<ObjectMetadata>;

    /// Fetch one listing page
    async fn list(&self, bucket: &str, options: ListOptions) -> RemoteResult<ListingPage>;

    /// Move (rename) an object, possibly across buckets
    async fn move_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> RemoteResult<()>;

    /// Copy an object, possibly across buckets
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> RemoteResult<()>;

    /// Delete one object
    async fn delete(&self, bucket: &str, key: &str) -> RemoteResult<()>;

    /// Delete several objects in one request
    async fn batch_delete(&self, bucket: &str, keys: &[String]) -> RemoteResult<BatchOutcome>;

    /// Stream a local file to the bucket
    async fn upload(
        &self,
        credential: &UploadCredential,
        key: &str,
        local_path: &Path,
    ) -> RemoteResult<UploadResult>;

    /// Fetch a remote URL into the bucket server-side
    async fn fetch(
        &self,
        url: &str,
        bucket: &str,
        key: Option<String>,
    ) -> RemoteResult<FetchResult>;

    /// Change the MIME type of an object
    async fn set_mime(&self, bucket: &str, key: &str, mime: &str) -> RemoteResult<()>;

    /// Change the storage tier of an object
    async fn set_storage_class(
        &self,
        bucket: &str,
        key: &str,
        class: StorageClass,
    ) -> RemoteResult<()>;

    /// Issue an upload credential scoped to (bucket, key)
    fn sign_upload(&self, bucket: &str, key: &str) -> UploadCredential;

    /// Sign a download URL valid for `expires_secs` seconds
    fn sign_url(&self, base_url: &str, expires_secs: u64) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_to_timestamp() {
        let ts = ticks_to_timestamp(16_000_000_000_000).unwrap();
        assert_eq!(ts.as_second(), 1_600_000);

        let ts = ticks_to_timestamp(15_000_000).unwrap();
        assert_eq!(ts.as_second(), 1);
        assert_eq!(ts.subsec_millisecond(), 500);

        assert_eq!(ticks_to_timestamp(0), Some(Timestamp::UNIX_EPOCH));
    }

    #[test]
    fn test_storage_class_codes() {
        assert_eq!(StorageClass::from_code(0), StorageClass::Standard);
        assert_eq!(StorageClass::from_code(1), StorageClass::LowFrequency);
        assert_eq!(StorageClass::from_code(2), StorageClass::Other(2));
        assert_eq!(StorageClass::LowFrequency.code(), 1);
        assert_eq!(StorageClass::Standard.label(), "standard");
        assert_eq!(StorageClass::LowFrequency.label(), "low frequency");
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::new(612, "no such file or directory");
        assert_eq!(err.to_string(), "(612)no such file or directory");
        assert_eq!(RemoteError::transport("timed out").status_code, 0);
    }

    #[test]
    fn test_batch_outcome() {
        let outcome = BatchOutcome {
            items: vec![BatchItem::ok("a"), BatchItem::failed("b", 612, "missing")],
        };
        assert!(!outcome.all_ok());
        let failed: Vec<_> = outcome.failed().map(|i| i.key.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
        assert!(BatchOutcome::default().all_ok());
    }
}
