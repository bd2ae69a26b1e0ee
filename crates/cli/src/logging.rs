//! Tracing subscriber setup
//!
//! The filter is chosen in this order: `RUST_LOG`, then `--debug`, then the
//! `loglevel` key of the configuration file, then `warn`. The configuration is
//! read after the subscriber is installed, so the filter sits behind a reload
//! handle that is only kept when neither `RUST_LOG` nor `--debug` decided it.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

const DEFAULT_LEVEL: &str = "warn";

/// Keeps the failure one-liners of the facade visible under a `RUST_LOG`
/// that only names other targets
const FAILURE_DIRECTIVE: &str = "qn_core::ops=error";

pub struct Logging {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl Logging {
    /// Install the global subscriber writing to stderr
    pub fn init(debug: bool) -> Self {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let fixed = fixed_directives(rust_log.as_deref(), debug);
        let filter = fixed
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL));

        let (filter, handle) = reload::Layer::new(filter);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();

        Self {
            handle: fixed.is_none().then_some(handle),
        }
    }

    /// Apply the configured level unless `RUST_LOG` or `--debug` already chose one
    pub fn apply_config_level(&self, level: Option<LevelFilter>) {
        let (Some(handle), Some(level)) = (&self.handle, level) else {
            return;
        };
        if let Err(e) = handle.reload(EnvFilter::default().add_directive(level.into())) {
            tracing::warn!("cannot apply loglevel {level}: {e}");
        }
    }
}

/// Directives decided before the configuration is read
///
/// `None` leaves the choice to the configuration file.
fn fixed_directives(rust_log: Option<&str>, debug: bool) -> Option<String> {
    match rust_log.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(env_directives(raw)),
        None if debug => Some("debug".to_string()),
        None => None,
    }
}

/// `RUST_LOG` plus the failure directive when nothing in it covers `qn_core`
fn env_directives(raw: &str) -> String {
    let covers_failures = raw.split(',').map(str::trim).any(|directive| {
        directive.starts_with("qn_core") || directive.parse::<LevelFilter>().is_ok()
    });
    if covers_failures {
        raw.to_string()
    } else {
        format!("{raw},{FAILURE_DIRECTIVE}")
    }
}
