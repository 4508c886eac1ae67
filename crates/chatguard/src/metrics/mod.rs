//! Interception metrics.
//!
//! In-process counters are always available through [`InterceptMetrics`].
//! With the `metrics` feature every update is mirrored into a Prometheus
//! registry that can be scraped in text exposition format.
//!
//! ```rust
//! use chatguard::metrics::InterceptMetrics;
//!
//! let metrics = InterceptMetrics::new();
//! metrics.trigger();
//! metrics.intercepted();
//! metrics.cancelled();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.triggers, 1);
//! assert_eq!(snapshot.live_sessions, 0);
//! ```

mod core;

#[cfg(feature = "metrics")]
pub mod prometheus_export;

pub use core::*;
