//! Category registry and persisted settings.
//!
//! [`Settings`] is the point-in-time snapshot every detection cycle reads:
//! one enabled flag per category plus the two presentation flags. It
//! serializes to the flat `key -> bool` map the host storage keeps.
//!
//! # Example
//!
//! ```rust
//! use chatguard::category::{BuiltinCategory, Category};
//! use chatguard::settings::Settings;
//!
//! let mut settings = Settings::default();
//! settings.set(&Category::from(BuiltinCategory::Email), false);
//!
//! assert!(!settings.is_enabled(&BuiltinCategory::Email.into()));
//! assert!(settings.is_enabled(&Category::from_label("PERSON")));
//! // Never configured: fail-closed.
//! assert!(!settings.is_enabled(&Category::from_label("MONEY")));
//! ```

mod hub;
mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{BuiltinCategory, Category, DEFAULT_EXTERNAL_LABELS};

pub use hub::SettingsHub;
pub use store::{FileStore, MemoryStore, SettingsStore};

/// Storage key of the selection toolbar flag.
pub const SHOW_TOOLBAR_KEY: &str = "SHOW_TOOLBAR";

/// Storage key of the protection indicator flag.
pub const SHOW_LOCK_ICON_KEY: &str = "SHOW_LOCK_ICON";

/// A snapshot of the category registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct Settings {
    /// Explicit value for every built-in category.
    builtin: BTreeMap<BuiltinCategory, bool>,
    /// Classifier labels the user has configured.
    external: BTreeMap<String, bool>,
    /// Whether the selection toolbar is offered.
    show_toolbar: bool,
    /// Whether the passive protection indicator is shown.
    show_lock_icon: bool,
}

impl Default for Settings {
    /// First-run settings: every known category enabled, both flags on.
    fn default() -> Self {
        Self {
            builtin: BuiltinCategory::ALL.into_iter().map(|c| (c, true)).collect(),
            external: DEFAULT_EXTERNAL_LABELS
                .into_iter()
                .map(|label| (label.to_string(), true))
                .collect(),
            show_toolbar: true,
            show_lock_icon: true,
        }
    }
}

impl Settings {
    /// Create first-run settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a category is enabled.
    ///
    /// Unknown categories are disabled: a label nobody configured is never
    /// acted upon.
    #[must_use]
    pub fn is_enabled(&self, category: &Category) -> bool {
        match category {
            Category::BuiltIn(b) => self.builtin.get(b).copied().unwrap_or(false),
            Category::External(label) => self.external.get(label).copied().unwrap_or(false),
        }
    }

    /// Check whether a label (as returned by the classifier) is enabled.
    #[must_use]
    pub fn is_label_enabled(&self, label: &str) -> bool {
        self.is_enabled(&Category::from_label(label))
    }

    /// Take a point-in-time copy.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Enable or disable a category.
    pub fn set(&mut self, category: &Category, enabled: bool) {
        match category {
            Category::BuiltIn(b) => {
                self.builtin.insert(*b, enabled);
            }
            Category::External(label) => {
                self.external.insert(label.clone(), enabled);
            }
        }
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, category: impl Into<Category>, enabled: bool) -> Self {
        self.set(&category.into(), enabled);
        self
    }

    /// Built-in categories currently enabled, in substitution order.
    pub fn enabled_builtins(&self) -> impl Iterator<Item = BuiltinCategory> + '_ {
        BuiltinCategory::ALL
            .into_iter()
            .filter(|c| self.builtin.get(c).copied().unwrap_or(false))
    }

    /// All configured categories with their flag.
    pub fn categories(&self) -> impl Iterator<Item = (Category, bool)> + '_ {
        self.builtin
            .iter()
            .map(|(c, on)| (Category::BuiltIn(*c), *on))
            .chain(
                self.external
                    .iter()
                    .map(|(label, on)| (Category::External(label.clone()), *on)),
            )
    }

    /// Enable every configured category. Presentation flags are untouched.
    pub fn select_all(&mut self) {
        self.builtin.values_mut().for_each(|v| *v = true);
        self.external.values_mut().for_each(|v| *v = true);
    }

    /// Disable every configured category. Presentation flags are untouched.
    pub fn deselect_all(&mut self) {
        self.builtin.values_mut().for_each(|v| *v = false);
        self.external.values_mut().for_each(|v| *v = false);
    }

    /// Restore first-run defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the selection toolbar should be offered.
    #[must_use]
    pub const fn show_toolbar(&self) -> bool {
        self.show_toolbar
    }

    /// Whether the protection indicator should be shown.
    #[must_use]
    pub const fn show_lock_icon(&self) -> bool {
        self.show_lock_icon
    }

    /// Set the selection toolbar flag.
    pub const fn set_show_toolbar(&mut self, show: bool) {
        self.show_toolbar = show;
    }

    /// Set the protection indicator flag.
    pub const fn set_show_lock_icon(&mut self, show: bool) {
        self.show_lock_icon = show;
    }
}

impl From<BTreeMap<String, bool>> for Settings {
    /// Read a stored map. The stored values are authoritative: a built-in
    /// category missing from the map is recorded as disabled.
    fn from(mut map: BTreeMap<String, bool>) -> Self {
        let show_toolbar = map.remove(SHOW_TOOLBAR_KEY).unwrap_or(true);
        let show_lock_icon = map.remove(SHOW_LOCK_ICON_KEY).unwrap_or(true);

        let builtin = BuiltinCategory::ALL
            .into_iter()
            .map(|c| {
                let enabled = map.remove(c.key()).unwrap_or_else(|| {
                    tracing::warn!(category = c.key(), "category missing from stored settings, treating as disabled");
                    false
                });
                (c, enabled)
            })
            .collect();

        Self {
            builtin,
            external: map,
            show_toolbar,
            show_lock_icon,
        }
    }
}

impl From<Settings> for BTreeMap<String, bool> {
    fn from(settings: Settings) -> Self {
        let mut map: Self = settings
            .builtin
            .into_iter()
            .map(|(c, on)| (c.key().to_string(), on))
            .chain(settings.external)
            .collect();
        map.insert(SHOW_TOOLBAR_KEY.to_string(), settings.show_toolbar);
        map.insert(SHOW_LOCK_ICON_KEY.to_string(), settings.show_lock_icon);
        map
    }
}
