//! Object references and URL resolution
//!
//! An object is addressed by a resolved bucket name and a key. Its
//! user-facing URL is either the bare bucket address (public buckets) or a
//! time-limited signed URL (private buckets).

use std::path::Path;

use crate::bucket::BucketConfig;
use crate::traits::StorageGateway;

/// Lifetime of signed URLs for private buckets, in seconds
pub const PRIVATE_URL_EXPIRES: u64 = 3600;

/// A reference to an object in a resolved bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Bucket name (never empty once resolved)
    pub bucket: String,
    /// Object key
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.bucket, self.key)
    }
}

/// Remote key used when uploading a local file without an explicit key
///
/// This is the file's base name; `None` if the path has no file name.
pub fn default_remote_key(local: &Path) -> Option<String> {
    local
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

/// Resolve the user-facing URL of an object
///
/// Public buckets get `{protocol}://{domain}/{key}`. Private buckets get the
/// same address signed for [`PRIVATE_URL_EXPIRES`] seconds.
pub fn url_for(signer: &dyn StorageGateway, bucket: &BucketConfig, key: &str) -> String {
    let base_url = bucket.base_url(key);
    if bucket.private {
        signer.sign_url(&base_url, PRIVATE_URL_EXPIRES)
    } else {
        base_url
    }
}
