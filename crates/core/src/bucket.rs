//! Bucket registry
//!
//! Buckets are named storage containers bound to a serving domain, a
//! protocol and an access policy. The registry resolves a logical bucket
//! name to its configuration, falling back to a default when the name is
//! empty or unknown.

use serde::{Deserialize, Serialize};

/// Name used when no bucket is configured at all
pub const PLACEHOLDER_BUCKET: &str = "your_bucket_name";

/// Domain used when no bucket is configured at all
pub const PLACEHOLDER_DOMAIN: &str = "www.yourdomain.com";

/// Protocol used to build public object URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketConfig {
    /// Unique bucket name
    pub name: String,

    /// Domain the bucket is served from
    pub domain: String,

    /// Protocol for object URLs
    #[serde(default)]
    pub protocol: Protocol,

    /// Whether object URLs must be signed
    #[serde(default)]
    pub private: bool,
}

impl BucketConfig {
    /// Create a public bucket configuration
    pub fn new(name: impl Into<String>, domain: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            protocol,
            private: false,
        }
    }

    /// Mark the bucket as private (signed URLs only)
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Built-in bucket returned when nothing is configured
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_BUCKET, PLACEHOLDER_DOMAIN, Protocol::Http)
    }

    /// Unsigned address of an object in this bucket
    pub fn base_url(&self, key: &str) -> String {
        format!("{}://{}/{}", self.protocol, self.domain, key)
    }

    /// "public" or "private"
    pub fn access_label(&self) -> &'static str {
        if self.private { "private" } else { "public" }
    }
}

/// Ordered, read-only set of configured buckets
#[derive(Debug, Clone)]
pub struct BucketRegistry {
    buckets: Vec<BucketConfig>,
    default_bucket: Option<String>,
    placeholder: BucketConfig,
}

impl BucketRegistry {
    /// Create a registry from buckets in configured order
    pub fn new(buckets: Vec<BucketConfig>) -> Self {
        Self {
            buckets,
            default_bucket: None,
            placeholder: BucketConfig::placeholder(),
        }
    }

    /// Prefer the named bucket when resolving an empty name
    pub fn with_default(mut self, name: Option<String>) -> Self {
        self.default_bucket = name.filter(|n| !n.is_empty());
        self
    }

    /// All configured buckets, in order
    pub fn buckets(&self) -> &[BucketConfig] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Look up a bucket by exact name without any fallback
    pub fn get(&self, name: &str) -> Option<&BucketConfig> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// The bucket used when no name is given
    ///
    /// The configured default bucket if it exists in the registry, otherwise
    /// the first bucket, otherwise the built-in placeholder.
    pub fn default_bucket(&self) -> &BucketConfig {
        self.default_bucket
            .as_deref()
            .and_then(|name| self.get(name))
            .or_else(|| self.buckets.first())
            .unwrap_or(&self.placeholder)
    }

    /// Resolve a bucket name to its configuration
    ///
    /// An unknown name resolves to the default bucket, exactly like an empty
    /// name does. The substitution is logged so typos do not go unnoticed.
    pub fn resolve(&self, name: &str) -> &BucketConfig {
        if name.is_empty() {
            return self.default_bucket();
        }

        match self.get(name) {
            Some(bucket) => bucket,
            None => {
                let fallback = self.default_bucket();
                tracing::warn!(
                    requested = name,
                    resolved = %fallback.name,
                    "bucket '{}' is not configured, using '{}'",
                    name,
                    fallback.name
                );
                fallback
            }
        }
    }

    /// Names that appear more than once, in first-seen order
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        let mut duplicates = Vec::new();
        for bucket in &self.buckets {
            let name = bucket.name.as_str();
            if seen.contains(&name) {
                if !duplicates.contains(&name) {
                    duplicates.push(name);
                }
            } else {
                seen.push(name);
            }
        }
        duplicates
    }
}
