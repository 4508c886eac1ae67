//! Test utilities for chatguard.
//!
//! Recording implementations of the host surfaces and a scriptable
//! classifier, for driving the interceptor without a browser or a network.

mod classifier;
mod surfaces;

pub use classifier::MockClassifier;
pub use surfaces::{DecisionCall, RecordingDecisions, RecordingInput};
