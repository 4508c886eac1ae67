//! Environment-based configuration.

use std::collections::HashMap;

use crate::error::{GuardError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "CHATGUARD";

/// Recognized variable names, without the prefix.
pub mod vars {
    /// Classifier base URL.
    pub const CLASSIFIER_URL: &str = "CLASSIFIER_URL";
    /// Whether to call the classifier.
    pub const CLASSIFIER_ENABLED: &str = "CLASSIFIER_ENABLED";
    /// Analyze bound in milliseconds.
    pub const ANALYZE_TIMEOUT_MS: &str = "ANALYZE_TIMEOUT_MS";
    /// Probe bound in milliseconds.
    pub const PROBE_TIMEOUT_MS: &str = "PROBE_TIMEOUT_MS";
    /// Settings file.
    pub const SETTINGS_PATH: &str = "SETTINGS_PATH";
    /// Log filter.
    pub const LOG: &str = "LOG";
    /// JSON log output.
    pub const LOG_JSON: &str = "LOG_JSON";
}

/// Environment variable reader.
///
/// Reads the process environment, or a fixed set of pairs when built with
/// [`from_pairs`](Self::from_pairs).
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
    fixed: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Read the process environment with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            fixed: None,
        }
    }

    /// Read from `pairs` (full variable names) instead of the process
    /// environment, with the default prefix.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            fixed: Some(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value. Empty values count as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        let value = match &self.fixed {
            Some(map) => map.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Get a millisecond count, failing on garbage.
    pub fn millis(&self, name: &str) -> Result<Option<u64>> {
        self.get(name)
            .map(|v| {
                v.trim().parse::<u64>().map_err(|e| {
                    GuardError::config(format!("{}: expected milliseconds, got {v:?}: {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
