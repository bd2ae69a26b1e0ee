//! qn-core: Core library for the qncli object storage client
//!
//! This crate provides the core functionality for qncli, including:
//! - Configuration loading and the bucket registry
//! - URL resolution for public and private buckets
//! - The StorageGateway trait for authenticated remote operations
//! - The bucket operations facade used by the CLI
//!
//! This crate does not talk to the network itself. The HTTP adapter lives in
//! `qn-kodo`, and tests substitute a mock gateway.

pub mod bucket;
pub mod config;
pub mod error;
pub mod format;
pub mod ops;
pub mod path;
pub mod traits;

pub use bucket::{BucketConfig, BucketRegistry, Protocol};
pub use config::{Config, ConfigManager, Credentials, HostsConfig, TimeoutConfig};
pub use error::{Error, Result};
pub use format::readable_size;
pub use ops::{BucketOps, Failure, ListStyle, Outcome};
pub use path::{ObjectRef, url_for};
pub use traits::{
    BatchItem, BatchOutcome, FetchResult, ListOptions, ListedObject, ListingPage, ObjectMetadata,
    RemoteError, RemoteResult, StorageClass, StorageGateway, UploadCredential, UploadResult,
};
