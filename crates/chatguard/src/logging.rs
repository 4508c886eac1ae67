//! Logging setup.
//!
//! Library code only emits `tracing` events. Binaries and tests call
//! [`init`] once to install a subscriber. Message text is never logged:
//! events carry lengths, category keys and session ids.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{GuardError, Result};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `chatguard=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Create default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enable or disable JSON output.
    #[must_use]
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Build the filter, preferring `RUST_LOG` over the configured directives.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.filter)
            .map_err(|e| GuardError::config(format!("invalid log filter {:?}: {e}", self.filter)))
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, by this
/// function or anyone else.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(false);
    }
    let filter = config.env_filter()?;

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .is_ok()
    };

    INITIALIZED.store(true, Ordering::Release);
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
        assert!(LoggingConfig::new().with_json(true).json);
    }

    #[test]
    fn bad_filter_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig::new().with_filter("chatguard=[");
        assert!(matches!(config.env_filter(), Err(GuardError::Config { .. })));
    }

    #[test]
    fn second_init_is_a_no_op() {
        let config = LoggingConfig::new().with_filter("warn");
        let _ = init(&config);
        assert!(!init(&config).unwrap());
    }
}
