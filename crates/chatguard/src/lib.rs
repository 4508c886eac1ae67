//! chatguard: PII interception for outgoing chat messages
//!
//! This crate sits between a chat input and its send action. It detects
//! personally identifiable information with structural patterns and an
//! optional external classifier, and lets the user redact, send as is, or
//! cancel before anything leaves their control.
//!
//! # Features
//!
//! - **Structural detection** of national IDs, emails, phones, passports,
//!   card numbers, birthdates and street addresses
//! - **Classifier augmentation** over HTTP with a bounded, cancellable call
//! - **Deterministic redaction** into bracketed category tags such as `[EMAIL]`
//! - **Send interception** as an explicit state machine with supersede
//!   semantics
//! - **Prometheus export** of interception counters (feature: `metrics`)
//!
//! # Example
//!
//! ```rust
//! use chatguard::prelude::*;
//!
//! let settings = Settings::default();
//! assert!(might_contain_pii("my id is 123456789012"));
//! assert_eq!(redact("my id is 123456789012", &settings, &[]), "my id is [ИИН]");
//! ```

pub mod category;
pub mod classifier;
pub mod config;
pub mod error;
pub mod health;
pub mod intercept;
pub mod logging;
pub mod metrics;
pub mod pii;
pub mod prelude;
pub mod settings;
pub mod util;

pub use category::{BuiltinCategory, Category};
pub use classifier::{
    Augmentation, AugmentationStatus, Classifier, EntityAugmenter, HttpClassifier, NoClassifier,
};
pub use config::{ClassifierConfig, ConfigLoader, EnvConfig, GuardConfig};
pub use error::{GuardError, Result};
pub use health::{ProtectionMonitor, ProtectionStatus};
pub use intercept::{
    Decision, DecisionOutcome, DecisionSurface, InputSurface, InterceptEvent, InterceptState,
    InterceptionSession, Interceptor, SessionId, TriggerEvent, TriggerOutcome,
};
pub use logging::LoggingConfig;
pub use metrics::{InterceptMetrics, MetricsSnapshot};
pub use pii::{Entity, Match, PatternDetector, RedactionPlan, might_contain_pii, redact};
pub use settings::{Settings, SettingsHub, SettingsStore};
pub use util::{TimeoutConfig, TimeoutExt};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{DecisionCall, MockClassifier, RecordingDecisions, RecordingInput};
