//! Tracing setup for the avr-verify binary
//!
//! Logging is installed before the configuration file is read so warnings
//! from config loading are visible. The level from `[logging]` is applied
//! afterwards, unless `RUST_LOG` was set.

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Level used until the configuration file has been read
pub const BOOTSTRAP_LEVEL: &str = "info";

/// Handle for swapping the filter once configuration is known
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    rust_log: Option<String>,
}

/// Install the global subscriber; logs go to stderr, stdout belongs to the console
pub fn init() -> LogLevelHandle {
    let (filter, handle) = bootstrap_filter(std::env::var("RUST_LOG").ok());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    handle
}

/// Reloadable filter starting at `RUST_LOG`, or [`BOOTSTRAP_LEVEL`] without it
pub fn bootstrap_filter(
    rust_log: Option<String>,
) -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    let directive = config_filter(rust_log.as_deref(), BOOTSTRAP_LEVEL)
        .or_else(|| rust_log.clone())
        .unwrap_or_default();
    let (filter, handle) = reload::Layer::new(EnvFilter::new(directive));
    (filter, LogLevelHandle { handle, rust_log })
}

impl LogLevelHandle {
    /// Switch to the configured level; a `RUST_LOG` setting keeps precedence
    pub fn apply_config_level(&self, level: &str) -> Result<(), reload::Error> {
        match config_filter(self.rust_log.as_deref(), level) {
            Some(directive) => self.handle.reload(EnvFilter::new(directive)),
            None => Ok(()),
        }
    }
}

/// Filter directive to use for `config_level`, or `None` when `RUST_LOG` wins
pub fn config_filter(rust_log: Option<&str>, config_level: &str) -> Option<String> {
    match rust_log {
        Some(value) if !value.trim().is_empty() => None,
        _ => Some(config_level.to_string()),
    }
}
