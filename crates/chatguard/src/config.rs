//! Runtime configuration.
//!
//! [`GuardConfig`] is read from `chatguard.toml` or `chatguard.json` (see
//! [`ConfigLoader`]) and then overridden from `CHATGUARD_*` environment
//! variables (see [`EnvConfig`]). Every field has a default, so an empty
//! file and no file at all are both valid.
//!
//! ```toml
//! settings_path = "/var/lib/chatguard/settings.json"
//!
//! [classifier]
//! endpoint = "http://localhost:5000"
//! analyze_timeout_ms = 3000
//!
//! [logging]
//! filter = "chatguard=debug"
//! ```

mod env;
mod file;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use env::{DEFAULT_PREFIX, EnvConfig, vars};
pub use file::{CONFIG_FILE_NAME, ConfigFormat, ConfigLoader, parse_config};

use crate::error::{GuardError, Result};
use crate::logging::LoggingConfig;
use crate::settings::{FileStore, MemoryStore, SettingsHub};
use crate::util::TimeoutConfig;

/// Default classifier endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Classifier client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL of the classifier service.
    pub endpoint: String,
    /// Whether to call the classifier at all.
    pub enabled: bool,
    /// Bound on `/analyze`, in milliseconds.
    pub analyze_timeout_ms: u64,
    /// Bound on `/health`, in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            enabled: true,
            analyze_timeout_ms: 3000,
            probe_timeout_ms: 2000,
        }
    }
}

impl ClassifierConfig {
    /// Call bounds as durations.
    #[must_use]
    pub const fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig::from_millis(self.analyze_timeout_ms, self.probe_timeout_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Classifier client.
    pub classifier: ClassifierConfig,
    /// Where category settings are persisted. In memory when unset.
    pub settings_path: Option<PathBuf>,
    /// Logging.
    pub logging: LoggingConfig,
}

impl GuardConfig {
    /// Load from the default search paths, then apply the environment.
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::with_default_paths().load_or_default()?;
        config.with_env(&EnvConfig::default())
    }

    /// Apply environment overrides.
    pub fn with_env(mut self, env: &EnvConfig) -> Result<Self> {
        if let Some(url) = env.get(vars::CLASSIFIER_URL) {
            self.classifier.endpoint = url;
        }
        if let Some(enabled) = env.bool(vars::CLASSIFIER_ENABLED) {
            self.classifier.enabled = enabled;
        }
        if let Some(ms) = env.millis(vars::ANALYZE_TIMEOUT_MS)? {
            self.classifier.analyze_timeout_ms = ms;
        }
        if let Some(ms) = env.millis(vars::PROBE_TIMEOUT_MS)? {
            self.classifier.probe_timeout_ms = ms;
        }
        if let Some(path) = env.get(vars::SETTINGS_PATH) {
            self.settings_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = env.get(vars::LOG) {
            self.logging.filter = filter;
        }
        if let Some(json) = env.bool(vars::LOG_JSON) {
            self.logging.json = json;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values no deployment can use.
    pub fn validate(&self) -> Result<()> {
        if self.classifier.analyze_timeout_ms == 0 || self.classifier.probe_timeout_ms == 0 {
            return Err(GuardError::config("classifier timeouts must be positive"));
        }
        if self.classifier.enabled && self.classifier.endpoint.trim().is_empty() {
            return Err(GuardError::config("classifier endpoint is empty"));
        }
        Ok(())
    }

    /// A settings hub backed by the configured store.
    #[must_use]
    pub fn settings_hub(&self) -> SettingsHub {
        match &self.settings_path {
            Some(path) => SettingsHub::new(FileStore::new(path)),
            None => SettingsHub::new(MemoryStore::new()),
        }
    }
}
