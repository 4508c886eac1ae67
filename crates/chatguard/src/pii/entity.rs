//! Classifier-supplied entities.

use serde::{Deserialize, Serialize};

use super::detector::{Match, MatchSource};
use crate::category::Category;

/// A `(literal text, label)` pair reported by the external classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// The literal text to mask.
    pub text: String,
    /// The category label, e.g. `PERSON`.
    pub label: String,
}

impl Entity {
    /// Create an entity.
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    /// The category this entity's label resolves to.
    #[must_use]
    pub fn category(&self) -> Category {
        Category::from_label(&self.label)
    }

    /// Normalize into the common match representation.
    #[must_use]
    pub fn to_match(&self) -> Match {
        Match {
            text: self.text.clone(),
            category: self.category(),
            source: MatchSource::External,
        }
    }
}
