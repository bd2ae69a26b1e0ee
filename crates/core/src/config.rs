//! Configuration management
//!
//! This module loads the qncli configuration file: credentials, the ordered
//! bucket list, optional service endpoints and an optional log level. The
//! file is JSON by default (`~/.config/qncli/config.json`); a `.toml`
//! extension selects TOML with the same schema. Unknown fields are rejected
//! rather than ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::bucket::{BucketConfig, BucketRegistry};
use crate::error::{Error, Result};

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV: &str = "QNCLI_CONFIG";

const DEFAULT_RS_HOST: &str = "https://rs.qbox.me";
const DEFAULT_RSF_HOST: &str = "https://rsf.qbox.me";
const DEFAULT_UC_HOST: &str = "https://uc.qbox.me";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Access key
    #[serde(default)]
    pub access_key: String,

    /// Secret key
    #[serde(default)]
    pub secret_key: String,

    /// Bucket used when none is given (defaults to the first bucket)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,

    /// Configured buckets, in order
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,

    /// Service endpoints
    #[serde(default)]
    pub hosts: HostsConfig,

    /// Network timeouts
    #[serde(default)]
    pub timeout: TimeoutConfig,

    /// Log level used when neither `RUST_LOG` nor `--debug` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loglevel: Option<String>,
}

/// Account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Service endpoints
///
/// The io and up hosts depend on the region a bucket lives in. When they are
/// not configured they are looked up per bucket through the `uc` host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostsConfig {
    /// Management host (stat, move, copy, delete, batch, metadata)
    #[serde(default = "default_rs_host")]
    pub rs: String,

    /// Listing host
    #[serde(default = "default_rsf_host")]
    pub rsf: String,

    /// Region query host
    #[serde(default = "default_uc_host")]
    pub uc: String,

    /// IO host (server-side fetch), looked up per bucket when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<String>,

    /// Upload host, looked up per bucket when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<String>,
}

fn default_rs_host() -> String {
    DEFAULT_RS_HOST.to_string()
}

fn default_rsf_host() -> String {
    DEFAULT_RSF_HOST.to_string()
}

fn default_uc_host() -> String {
    DEFAULT_UC_HOST.to_string()
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            rs: default_rs_host(),
            rsf: default_rsf_host(),
            uc: default_uc_host(),
            io: None,
            up: None,
        }
    }
}

impl HostsConfig {
    /// Point every endpoint at the same base URL
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            rs: base.clone(),
            rsf: base.clone(),
            uc: base.clone(),
            io: Some(base.clone()),
            up: Some(base),
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Request timeout in milliseconds (not applied to uploads)
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

impl Config {
    /// Create a configuration with credentials and buckets only
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        buckets: Vec<BucketConfig>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            default_bucket: None,
            buckets,
            hosts: HostsConfig::default(),
            timeout: TimeoutConfig::default(),
            loglevel: None,
        }
    }

    /// Credentials, or an error if either key is empty
    pub fn credentials(&self) -> Result<Credentials> {
        if self.access_key.trim().is_empty() || self.secret_key.trim().is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Credentials {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
        })
    }

    /// Parsed `loglevel`, if set
    ///
    /// Accepts tracing level names and the `WARNING`/`CRITICAL` spellings,
    /// in any case.
    pub fn log_level(&self) -> Result<Option<LevelFilter>> {
        let Some(name) = self.loglevel.as_deref().map(str::trim).filter(|n| !n.is_empty())
        else {
            return Ok(None);
        };
        let level = match name.to_ascii_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" | "warning" => LevelFilter::WARN,
            "error" | "critical" => LevelFilter::ERROR,
            "off" => LevelFilter::OFF,
            _ => return Err(Error::Config(format!("unknown loglevel '{name}'"))),
        };
        Ok(Some(level))
    }

    /// Build the bucket registry described by this configuration
    pub fn registry(&self) -> BucketRegistry {
        BucketRegistry::new(self.buckets.clone()).with_default(self.default_bucket.clone())
    }

    /// Check the configuration for fatal problems and log suspicious ones
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;
        self.log_level()?;

        for (index, bucket) in self.buckets.iter().enumerate() {
            if bucket.name.is_empty() {
                return Err(Error::Config(format!("bucket #{} has an empty name", index + 1)));
            }
            if bucket.domain.is_empty() {
                return Err(Error::Config(format!(
                    "bucket '{}' has an empty domain",
                    bucket.name
                )));
            }
        }

        let registry = self.registry();
        for name in registry.duplicate_names() {
            tracing::warn!("bucket '{}' is configured more than once, the first entry wins", name);
        }

        if let Some(name) = &self.default_bucket
            && !name.is_empty()
            && registry.get(name).is_none()
        {
            tracing::warn!(
                "default bucket '{}' is not configured, using '{}'",
                name,
                registry.default_bucket().name
            );
        }

        Ok(())
    }
}

/// On-disk configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

/// Configuration manager handles locating and loading config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager
    ///
    /// Uses `$QNCLI_CONFIG` if set, otherwise `<config dir>/qncli/config.json`.
    pub fn new() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::with_path(PathBuf::from(path)));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("qncli").join("config.json");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load and validate configuration from disk
    ///
    /// A missing file is an error: credentials are required.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {}",
                self.config_path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config = Self::parse(&content, Format::from_path(&self.config_path))?;
        tracing::debug!(
            path = %self.config_path.display(),
            buckets = config.buckets.len(),
            "loaded configuration"
        );

        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, format: Format) -> Result<Config> {
        let config = match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }
}
