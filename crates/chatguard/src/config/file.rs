//! File-based configuration loading.

use std::path::{Path, PathBuf};

use super::GuardConfig;
use crate::error::{GuardError, Result};

/// Base name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "chatguard";

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// Configuration file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with no search paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The working directory, then `$XDG_CONFIG_HOME/chatguard` (or
    /// `~/.config/chatguard`).
    #[must_use]
    pub fn with_default_paths() -> Self {
        let mut loader = Self::new().add_path(".");
        let config_home = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
        if let Some(dir) = config_home {
            loader = loader.add_path(dir.join(CONFIG_FILE_NAME));
        }
        loader
    }

    /// Add a search path.
    #[must_use]
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Search paths in order.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find `name.toml` or `name.json` in the search paths.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|dir| {
            [ConfigFormat::Toml, ConfigFormat::Json]
                .into_iter()
                .map(|format| dir.join(format!("{name}.{}", format.extension())))
                .find(|path| path.is_file())
        })
    }

    /// Load a config file.
    pub fn load(&self, path: &Path) -> Result<GuardConfig> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            GuardError::config(format!("unknown config format: {}", path.display()))
        })?;
        let content = std::fs::read_to_string(path)?;
        let config = parse_config(&content, format)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load the first `chatguard.*` found, or defaults if there is none.
    pub fn load_or_default(&self) -> Result<GuardConfig> {
        match self.find(CONFIG_FILE_NAME) {
            Some(path) => self.load(&path),
            None => Ok(GuardConfig::default()),
        }
    }
}

/// Parse config content.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<GuardConfig> {
    let config = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    Ok(config)
}
