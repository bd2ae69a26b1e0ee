//! Exit code definitions for qncli
//!
//! Scripts rely on these values. Changing one is a breaking change.

use qn_core::{Failure, Outcome};

/// Exit codes for the qncli application.
///
/// Failed operations are differentiated by the status code the storage
/// service reported, so scripts can tell "not found" from "no network".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// The operation failed for a reason not covered below
    GeneralError = 1,

    /// Invalid arguments, unusable local input or configuration
    UsageError = 2,

    /// No response from the service, or a 5xx
    NetworkError = 3,

    /// Credentials rejected (401/403)
    AuthError = 4,

    /// Bucket or object does not exist (404/612/631)
    NotFound = 5,

    /// Target already exists (614)
    Conflict = 6,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Map a remote status code (0 when no response was received)
    pub const fn from_status(status_code: u16) -> Self {
        match status_code {
            0 | 500..=599 => Self::NetworkError,
            401 | 403 => Self::AuthError,
            404 | 612 | 631 => Self::NotFound,
            614 => Self::Conflict,
            _ => Self::GeneralError,
        }
    }

    /// Exit code for a facade outcome
    pub fn from_outcome(outcome: &Outcome) -> Self {
        match &outcome.failure {
            None if outcome.success => Self::Success,
            None => Self::GeneralError,
            Some(Failure::Invalid { .. }) => Self::UsageError,
            Some(Failure::Remote(err)) => Self::from_status(err.status_code),
        }
    }

    /// Exit code for a configuration or setup error
    pub fn from_error(error: &qn_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "Operation failed",
            Self::UsageError => "Invalid arguments, input or configuration",
            Self::NetworkError => "Network or service error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
