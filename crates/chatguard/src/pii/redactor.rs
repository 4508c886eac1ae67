//! Redaction engine.
//!
//! A [`RedactionPlan`] is an ordered list of substitution rules: first the
//! enabled built-in categories in their fixed order, then classifier
//! entities in response order. Each rule is a global replace over the
//! output of the previous one.
//!
//! Spans are not tracked between rules. A tag written by an earlier rule
//! can be matched again by a later one, and when two rules overlap the one
//! that runs first consumes the text. Both behaviors are covered by tests.

use regex::{NoExpand, Regex};

use super::detector::pattern;
use super::entity::Entity;
use crate::category::Category;
use crate::settings::Settings;

/// One substitution rule.
#[derive(Debug, Clone)]
pub struct RedactionRule {
    category: Category,
    matcher: Regex,
    replacement: String,
}

impl RedactionRule {
    /// Rule for a category with an arbitrary matcher.
    #[must_use]
    pub fn new(category: Category, matcher: Regex) -> Self {
        let replacement = category.tag();
        Self {
            category,
            matcher,
            replacement,
        }
    }

    /// Rule that matches `literal` verbatim.
    ///
    /// Every regex metacharacter is escaped, so `a.b+c` only matches the
    /// five characters `a.b+c`.
    pub fn literal(category: Category, literal: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(category, Regex::new(&regex::escape(literal))?))
    }

    /// Category replaced by this rule.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// The bracketed tag written in place of each match.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// The underlying pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }
}

/// Result of applying a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    /// The fully substituted text.
    pub text: String,
    /// Number of replacements made per rule, in plan order (rules that
    /// replaced nothing are omitted).
    pub replaced: Vec<(Category, usize)>,
}

impl Redaction {
    /// Total number of replacements.
    #[must_use]
    pub fn total(&self) -> usize {
        self.replaced.iter().map(|(_, n)| n).sum()
    }

    /// Whether anything was replaced.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.replaced.is_empty()
    }
}

/// Ordered substitution plan.
#[derive(Debug, Clone, Default)]
pub struct RedactionPlan {
    rules: Vec<RedactionRule>,
}

impl RedactionPlan {
    /// Build the plan for a settings snapshot and a (possibly empty) entity
    /// list.
    ///
    /// Entities whose label is not an enabled category are skipped, as are
    /// blank literals.
    #[must_use]
    pub fn build(settings: &Settings, entities: &[Entity]) -> Self {
        let mut rules: Vec<RedactionRule> = settings
            .enabled_builtins()
            .map(|c| RedactionRule::new(Category::BuiltIn(c), pattern(c).clone()))
            .collect();

        for entity in entities {
            let category = entity.category();
            if !settings.is_enabled(&category) {
                tracing::debug!(label = %entity.label, "entity label not enabled, skipping");
                continue;
            }
            if entity.text.trim().is_empty() {
                tracing::debug!(label = %entity.label, "blank entity literal, skipping");
                continue;
            }
            match RedactionRule::literal(category, &entity.text) {
                Ok(rule) => rules.push(rule),
                // An escaped literal only fails on the regex size limit.
                Err(e) => tracing::warn!(label = %entity.label, error = %e, "entity literal rejected"),
            }
        }

        Self { rules }
    }

    /// The rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[RedactionRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order.
    #[must_use]
    pub fn apply(&self, text: &str) -> Redaction {
        let mut current = text.to_string();
        let mut replaced = Vec::new();

        for rule in &self.rules {
            let count = rule.matcher.find_iter(&current).count();
            if count == 0 {
                continue;
            }
            current = rule
                .matcher
                .replace_all(&current, NoExpand(&rule.replacement))
                .into_owned();
            replaced.push((rule.category.clone(), count));
        }

        Redaction {
            text: current,
            replaced,
        }
    }
}

/// Redact `text` with a settings snapshot and classifier entities.
#[must_use]
pub fn redact(text: &str, settings: &Settings, entities: &[Entity]) -> String {
    RedactionPlan::build(settings, entities).apply(text).text
}
