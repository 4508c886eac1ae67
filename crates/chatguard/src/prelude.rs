//! Convenient re-exports for common chatguard usage.
//!
//! ```ignore
//! use chatguard::prelude::*;
//!
//! let config = GuardConfig::load()?;
//! let hub = config.settings_hub();
//! hub.initialize()?;
//!
//! let classifier = HttpClassifier::from_config(&config.classifier)?;
//! let guard = Interceptor::new(classifier, input, decisions, hub.subscribe());
//! ```

// Categories and settings
pub use crate::category::{BuiltinCategory, Category};
pub use crate::settings::{FileStore, MemoryStore, Settings, SettingsHub, SettingsStore};

// Error handling
pub use crate::error::{GuardError, Result};

// Detection and redaction
pub use crate::pii::{Entity, PatternDetector, RedactionPlan, might_contain_pii, redact};

// Classifier
pub use crate::classifier::{AugmentationStatus, Classifier, EntityAugmenter, HttpClassifier, NoClassifier};
pub use crate::health::{ProtectionMonitor, ProtectionStatus};

// Interception
pub use crate::intercept::{
    Decision, DecisionOutcome, DecisionSurface, InputSurface, InterceptEvent, InterceptState,
    Interceptor, SessionId, TriggerEvent, TriggerOutcome,
};

// Configuration
pub use crate::config::GuardConfig;
pub use crate::logging::LoggingConfig;
