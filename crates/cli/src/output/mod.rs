//! Output formatting utilities
//!
//! Human-readable or JSON output for command results, plus the spinner shown
//! while an upload is in flight.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::Spinner;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable the upload spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
