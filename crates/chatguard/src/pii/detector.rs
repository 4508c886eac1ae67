//! Structural PII detection.
//!
//! Every built-in category has one fixed pattern. Detection is stateless:
//! the enabled set comes from the [`Settings`] snapshot passed in.

use regex::Regex;
use std::sync::LazyLock;

use crate::category::{BuiltinCategory, Category};
use crate::settings::Settings;

/// Where a match came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSource {
    /// A built-in structural pattern.
    Pattern,
    /// An entity reported by the external classifier.
    External,
}

/// A detected occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The matched literal text.
    pub text: String,
    /// Category of the match.
    pub category: Category,
    /// Origin of the match.
    pub source: MatchSource,
}

/// Compiled patterns for the built-in categories.
/// These are compile-time constant patterns that are validated during development.
///
/// Digit runs use ASCII word boundaries: a Cyrillic letter glued to a digit
/// (`ИИН123456789012`) still delimits the run.
static NATIONAL_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{12}(?-u:\b)").expect("national ID pattern is a valid regex")
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("email pattern is a valid regex")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+7|8)[0-9]{10}").expect("phone pattern is a valid regex")
});

static PASSPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{9}(?-u:\b)").expect("passport pattern is a valid regex")
});

static CARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{16}(?-u:\b)").expect("card pattern is a valid regex")
});

// The regex crate has no backreferences, so "same separator twice" is
// spelled out per separator.
static BIRTHDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)(?:[0-9]{2}\.[0-9]{2}\.[0-9]{4}|[0-9]{2}/[0-9]{2}/[0-9]{4}|[0-9]{2}-[0-9]{2}-[0-9]{4})(?-u:\b)")
        .expect("birthdate pattern is a valid regex")
});

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:ул\.|улица|проспект|пр\.|микрорайон|мкр\.|пр-т)\s+[\w\-]+(?:\s*,?\s*(?:дом|д\.|уч\.)?\s*\d+)?(?:\s*,?\s*(?:кв\.|квартира|офис|оф\.)?\s*\d+)?",
    )
    .expect("address pattern is a valid regex")
});

/// Looser superset used only to decide whether to intercept a send.
static SUSPICION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u:\b)(?:[0-9]{12}|[0-9]{16}|[0-9]{9}|[0-9]{2}[./-][0-9]{2}[./-][0-9]{4})(?-u:\b)|@|(?:\+7|8)[0-9]{10}",
    )
    .expect("suspicion pattern is a valid regex")
});

/// The structural pattern of a built-in category.
#[must_use]
pub fn pattern(category: BuiltinCategory) -> &'static Regex {
    match category {
        BuiltinCategory::NationalId => &NATIONAL_ID_PATTERN,
        BuiltinCategory::Email => &EMAIL_PATTERN,
        BuiltinCategory::Phone => &PHONE_PATTERN,
        BuiltinCategory::Passport => &PASSPORT_PATTERN,
        BuiltinCategory::CardNumber => &CARD_PATTERN,
        BuiltinCategory::Birthdate => &BIRTHDATE_PATTERN,
        BuiltinCategory::Address => &ADDRESS_PATTERN,
    }
}

/// Cheap pre-check: might this text contain anything sensitive?
///
/// Independent of configuration. A positive answer only opens an
/// interception session; it decides nothing about what gets redacted.
#[must_use]
pub fn might_contain_pii(text: &str) -> bool {
    SUSPICION_PATTERN.is_match(text)
}

/// Stateless structural detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDetector;

impl PatternDetector {
    /// Create a detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Find every occurrence of every enabled built-in category.
    ///
    /// Detectors run independently over the original text, so one span can
    /// be reported under two categories.
    #[must_use]
    pub fn detect(&self, text: &str, settings: &Settings) -> Vec<Match> {
        settings
            .enabled_builtins()
            .flat_map(|category| {
                pattern(category).find_iter(text).map(move |m| Match {
                    text: m.as_str().to_string(),
                    category: Category::BuiltIn(category),
                    source: MatchSource::Pattern,
                })
            })
            .collect()
    }

    /// Enabled categories whose structural rule matches somewhere in `text`.
    #[must_use]
    pub fn matching_categories(&self, text: &str, settings: &Settings) -> Vec<BuiltinCategory> {
        settings
            .enabled_builtins()
            .filter(|c| pattern(*c).is_match(text))
            .collect()
    }

    /// Check if any enabled category matches.
    #[must_use]
    pub fn contains_pii(&self, text: &str, settings: &Settings) -> bool {
        settings.enabled_builtins().any(|c| pattern(c).is_match(text))
    }
}
