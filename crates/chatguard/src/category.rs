//! PII categories.
//!
//! A category is either one of the fixed built-in structural categories or
//! an open-ended label supplied by the external classifier. Categories are
//! configuration keys, not detected instances.

use std::fmt;

/// Built-in categories recognized by structural patterns.
///
/// The declaration order is the fixed order in which substitutions run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinCategory {
    /// 12-digit national identification number.
    NationalId,
    /// Email address.
    Email,
    /// Phone number with a `+7` or `8` prefix.
    Phone,
    /// 9-digit passport number.
    Passport,
    /// 16-digit card number.
    CardNumber,
    /// Date of birth (`dd.mm.yyyy` and friends).
    Birthdate,
    /// Street address.
    Address,
}

impl BuiltinCategory {
    /// All built-in categories in substitution order.
    pub const ALL: [Self; 7] = [
        Self::NationalId,
        Self::Email,
        Self::Phone,
        Self::Passport,
        Self::CardNumber,
        Self::Birthdate,
        Self::Address,
    ];

    /// The settings key and tag label of this category.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NationalId => "ИИН",
            Self::Email => "EMAIL",
            Self::Phone => "ТЕЛЕФОН",
            Self::Passport => "ПАСПОРТ",
            Self::CardNumber => "КАРТА",
            Self::Birthdate => "ДАТА РОЖДЕНИЯ",
            Self::Address => "ADDRESS",
        }
    }

    /// A human-readable English name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NationalId => "National ID",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Passport => "Passport",
            Self::CardNumber => "Card Number",
            Self::Birthdate => "Birthdate",
            Self::Address => "Address",
        }
    }

    /// Look up a built-in category by its settings key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for BuiltinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A PII category: built-in or classifier-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// A built-in structural category.
    BuiltIn(BuiltinCategory),
    /// A label returned by the external classifier (e.g. `PERSON`).
    External(String),
}

impl Category {
    /// Resolve a label into a category.
    ///
    /// Labels equal to a built-in key map onto the built-in category, so a
    /// classifier reporting `EMAIL` is gated by the same toggle as the
    /// structural email rule.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        BuiltinCategory::from_key(label)
            .map_or_else(|| Self::External(label.to_string()), Self::BuiltIn)
    }

    /// The settings key of this category.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::BuiltIn(b) => b.key(),
            Self::External(label) => label,
        }
    }

    /// The bracketed redaction tag, e.g. `[EMAIL]`.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("[{}]", self.key())
    }
}

impl From<BuiltinCategory> for Category {
    fn from(value: BuiltinCategory) -> Self {
        Self::BuiltIn(value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classifier labels enabled by default on first run.
pub const DEFAULT_EXTERNAL_LABELS: [&str; 4] = ["PERSON", "ORG", "LOC", "GPE"];
