//! In-process counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// A value that goes up and down.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement by 1, saturating at zero.
    pub fn dec(&self) {
        let _ = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
    }

    /// Get current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Measures how long something took.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start timing.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Counters for the interception workflow.
#[derive(Debug, Default)]
pub struct InterceptMetrics {
    /// Send triggers observed.
    pub triggers: Counter,
    /// Triggers that were not intercepted.
    pub passed_through: Counter,
    /// Triggers suppressed into a session.
    pub intercepted: Counter,
    /// Sessions resolved by redaction.
    pub redacted: Counter,
    /// Sessions resolved by sending the original text.
    pub sent_as_is: Counter,
    /// Sessions cancelled by the user.
    pub cancelled: Counter,
    /// Sessions replaced by a newer attempt.
    pub superseded: Counter,
    /// Classifier timeouts and errors.
    pub classifier_failures: Counter,
    /// Sessions awaiting a decision or analysis.
    pub live_sessions: Gauge,
}

impl InterceptMetrics {
    /// Create zeroed metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A send trigger was observed.
    pub fn trigger(&self) {
        self.triggers.inc();
        #[cfg(feature = "metrics")]
        export(|m| m.trigger());
    }

    /// The trigger was let through.
    pub fn passed_through(&self) {
        self.passed_through.inc();
        #[cfg(feature = "metrics")]
        export(|m| m.outcome("passed_through"));
    }

    /// The trigger opened a session.
    pub fn intercepted(&self) {
        self.intercepted.inc();
        self.live_sessions.inc();
        #[cfg(feature = "metrics")]
        export(|m| m.session_opened());
    }

    /// A session was resolved by redaction.
    pub fn redacted(&self, analysis: Duration) {
        self.redacted.inc();
        self.live_sessions.dec();
        #[cfg(feature = "metrics")]
        export(|m| {
            m.session_closed("redacted");
            m.analysis_finished(analysis.as_secs_f64());
        });
        #[cfg(not(feature = "metrics"))]
        let _ = analysis;
    }

    /// A session was resolved by sending as is.
    pub fn sent_as_is(&self) {
        self.sent_as_is.inc();
        self.live_sessions.dec();
        #[cfg(feature = "metrics")]
        export(|m| m.session_closed("sent_as_is"));
    }

    /// A session was cancelled.
    pub fn cancelled(&self) {
        self.cancelled.inc();
        self.live_sessions.dec();
        #[cfg(feature = "metrics")]
        export(|m| m.session_closed("cancelled"));
    }

    /// A session was superseded.
    pub fn superseded(&self) {
        self.superseded.inc();
        self.live_sessions.dec();
        #[cfg(feature = "metrics")]
        export(|m| m.session_closed("superseded"));
    }

    /// The classifier could not help.
    pub fn classifier_failure(&self, timeout: bool) {
        self.classifier_failures.inc();
        #[cfg(feature = "metrics")]
        export(|m| m.classifier_failure(if timeout { "timeout" } else { "error" }));
        #[cfg(not(feature = "metrics"))]
        let _ = timeout;
    }

    /// Get a point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            triggers: self.triggers.get(),
            passed_through: self.passed_through.get(),
            intercepted: self.intercepted.get(),
            redacted: self.redacted.get(),
            sent_as_is: self.sent_as_is.get(),
            cancelled: self.cancelled.get(),
            superseded: self.superseded.get(),
            classifier_failures: self.classifier_failures.get(),
            live_sessions: self.live_sessions.get(),
        }
    }
}

#[cfg(feature = "metrics")]
fn export(f: impl FnOnce(&super::prometheus_export::GuardMetrics)) {
    if let Some(metrics) = super::prometheus_export::GuardMetrics::global() {
        f(metrics);
    }
}

/// Point-in-time copy of [`InterceptMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Send triggers observed.
    pub triggers: u64,
    /// Triggers not intercepted.
    pub passed_through: u64,
    /// Sessions opened.
    pub intercepted: u64,
    /// Redact resolutions.
    pub redacted: u64,
    /// Send-as-is resolutions.
    pub sent_as_is: u64,
    /// Cancel resolutions.
    pub cancelled: u64,
    /// Superseded sessions.
    pub superseded: u64,
    /// Classifier failures.
    pub classifier_failures: u64,
    /// Sessions currently live.
    pub live_sessions: u64,
}

impl MetricsSnapshot {
    /// Sessions that reached a resolution or were superseded.
    #[must_use]
    pub const fn closed(&self) -> u64 {
        self.redacted + self.sent_as_is + self.cancelled + self.superseded
    }
}
