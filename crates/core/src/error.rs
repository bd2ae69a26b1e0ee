//! Error types for qn-core
//!
//! Only configuration and local setup problems are errors. Remote operation
//! failures never surface here; the facade folds them into an `Outcome`.

use thiserror::Error;

/// Result type alias for qn-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for qn-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Access key or secret key is missing or empty
    #[error("Configuration error: access_key and secret_key are required")]
    MissingCredentials,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::MissingCredentials
            | Error::TomlParse(_)
            | Error::Json(_)
            | Error::InvalidUrl(_) => 2, // UsageError
            _ => 1,                      // GeneralError
        }
    }
}
