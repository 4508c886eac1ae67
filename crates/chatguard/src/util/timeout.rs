//! Bounds on classifier calls.
//!
//! [`TimeoutConfig`] holds one bound per call kind; [`TimeoutExt`] applies
//! a bound to any future.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Timeout, timeout};

/// Extension trait for adding timeouts to futures.
pub trait TimeoutExt: Sized {
    /// Wrap this future with a timeout.
    fn with_timeout(self, duration: Duration) -> Timeout<Self>;
}

impl<F: Future> TimeoutExt for F {
    fn with_timeout(self, duration: Duration) -> Timeout<Self> {
        timeout(duration, self)
    }
}

/// Bounds for classifier calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Bound on an `/analyze` call.
    pub analyze: Duration,
    /// Bound on a `/health` probe.
    pub probe: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_millis(3000, 2000)
    }
}

impl TimeoutConfig {
    /// Bounds given in milliseconds, as configuration stores them.
    #[must_use]
    pub const fn from_millis(analyze_ms: u64, probe_ms: u64) -> Self {
        Self {
            analyze: Duration::from_millis(analyze_ms),
            probe: Duration::from_millis(probe_ms),
        }
    }

    /// The same bound for every call.
    #[must_use]
    pub const fn uniform(bound: Duration) -> Self {
        Self {
            analyze: bound,
            probe: bound,
        }
    }
}
