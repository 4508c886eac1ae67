//! PII detection and redaction.
//!
//! Structural patterns live in [`detector`], classifier-supplied entities in
//! [`entity`], and the substitution engine that combines both in
//! [`redactor`].
//!
//! # Example
//!
//! ```rust
//! use chatguard::pii::{Entity, redact};
//! use chatguard::settings::Settings;
//!
//! let settings = Settings::default();
//! let entities = [Entity::new("John Smith", "PERSON")];
//!
//! let out = redact("John Smith, a@b.com", &settings, &entities);
//! assert_eq!(out, "[PERSON], [EMAIL]");
//! ```

pub mod detector;
pub mod entity;
pub mod redactor;

pub use detector::{Match, MatchSource, PatternDetector, might_contain_pii, pattern};
pub use entity::Entity;
pub use redactor::{Redaction, RedactionPlan, RedactionRule, redact};
