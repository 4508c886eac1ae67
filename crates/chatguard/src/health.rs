//! Protection status.
//!
//! Tracks whether the classifier is reachable so the presentation layer can
//! show full protection, pattern-only protection, or a probe error.

use std::fmt;
use std::time::{Duration, Instant};

use crate::classifier::Classifier;

/// How well outgoing text is currently protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtectionStatus {
    /// Patterns and classifier both active.
    Protected,
    /// Classifier unreachable; structural patterns only.
    Limited,
    /// The probe itself failed unexpectedly.
    Error,
    /// Never probed.
    #[default]
    Unknown,
}

impl ProtectionStatus {
    /// Check if the classifier is contributing.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Protected)
    }

    /// Check if at least pattern protection is known to be active.
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        matches!(self, Self::Protected | Self::Limited)
    }

    /// Lowercase name used by the indicator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Limited => "limited",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProtectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one probe.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Status the probe indicates on its own.
    pub status: ProtectionStatus,
    /// Failure description.
    pub message: Option<String>,
    /// How long the probe took.
    pub duration: Duration,
    /// When the probe finished.
    pub timestamp: Instant,
}

impl ProbeResult {
    fn new(status: ProtectionStatus, message: Option<String>, duration: Duration) -> Self {
        Self {
            status,
            message,
            duration,
            timestamp: Instant::now(),
        }
    }
}

/// Monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Minimum spacing between probes.
    pub interval: Duration,
    /// Consecutive failures before reporting [`ProtectionStatus::Limited`].
    pub failure_threshold: u32,
    /// Consecutive successes before reporting [`ProtectionStatus::Protected`].
    pub success_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            failure_threshold: 1,
            success_threshold: 1,
        }
    }
}

impl MonitorConfig {
    /// Create default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set success threshold.
    #[must_use]
    pub const fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }
}

/// Classifier liveness tracker.
///
/// Below the failure threshold a failing classifier keeps its previous
/// status, so a single dropped probe does not flip the indicator.
#[derive(Debug)]
pub struct ProtectionMonitor {
    config: MonitorConfig,
    status: ProtectionStatus,
    failures: u32,
    successes: u32,
    last_check: Option<Instant>,
    last_result: Option<ProbeResult>,
}

impl ProtectionMonitor {
    /// Create a monitor in the [`ProtectionStatus::Unknown`] state.
    #[must_use]
    pub const fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            status: ProtectionStatus::Unknown,
            failures: 0,
            successes: 0,
            last_check: None,
            last_result: None,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> ProtectionStatus {
        self.status
    }

    /// Result of the latest probe.
    #[must_use]
    pub const fn last_result(&self) -> Option<&ProbeResult> {
        self.last_result.as_ref()
    }

    /// Check if a probe is due.
    #[must_use]
    pub fn is_check_due(&self) -> bool {
        self.last_check
            .is_none_or(|last| last.elapsed() >= self.config.interval)
    }

    /// Record that the classifier answered.
    pub fn record_success(&mut self) {
        self.record_success_after(Duration::ZERO);
    }

    fn record_success_after(&mut self, duration: Duration) {
        self.failures = 0;
        self.successes += 1;
        self.last_check = Some(Instant::now());
        if self.successes >= self.config.success_threshold {
            self.status = ProtectionStatus::Protected;
        }
        self.last_result = Some(ProbeResult::new(ProtectionStatus::Protected, None, duration));
    }

    /// Record that the classifier could not help.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.record_failure_after(message.into(), Duration::ZERO);
    }

    fn record_failure_after(&mut self, message: String, duration: Duration) {
        self.successes = 0;
        self.failures += 1;
        self.last_check = Some(Instant::now());
        if self.failures >= self.config.failure_threshold {
            self.status = ProtectionStatus::Limited;
        }
        self.last_result = Some(ProbeResult::new(
            ProtectionStatus::Limited,
            Some(message),
            duration,
        ));
    }

    /// Record that the probe broke in an unexpected way.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.successes = 0;
        self.last_check = Some(Instant::now());
        self.status = ProtectionStatus::Error;
        self.last_result = Some(ProbeResult::new(
            ProtectionStatus::Error,
            Some(message.into()),
            Duration::ZERO,
        ));
    }

    /// Run one probe against `classifier` and update the status.
    ///
    /// The probe is bounded by the classifier's own probe timeout.
    pub async fn check<C: Classifier>(&mut self, classifier: &C) -> ProtectionStatus {
        let started = Instant::now();
        match classifier.probe().await {
            Ok(true) => self.record_success_after(started.elapsed()),
            Ok(false) => {
                self.record_failure_after("classifier reported unhealthy".into(), started.elapsed());
            }
            Err(e) if e.is_classifier_failure() => {
                self.record_failure_after(e.to_string(), started.elapsed());
            }
            Err(e) => self.record_error(e.to_string()),
        }
        tracing::debug!(status = %self.status, "protection probe finished");
        self.status
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.status = ProtectionStatus::Unknown;
        self.failures = 0;
        self.successes = 0;
        self.last_check = None;
        self.last_result = None;
    }
}

impl Default for ProtectionMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::NoClassifier;
    use crate::test_utils::MockClassifier;

    #[test]
    fn status_predicates() {
        assert!(ProtectionStatus::Protected.is_protected());
        assert!(ProtectionStatus::Limited.is_operational());
        assert!(!ProtectionStatus::Limited.is_protected());
        assert!(!ProtectionStatus::Error.is_operational());
        assert_eq!(ProtectionStatus::default().to_string(), "unknown");
    }

    #[test]
    fn thresholds() {
        let mut monitor = ProtectionMonitor::new(MonitorConfig::new().with_failure_threshold(2));
        assert_eq!(monitor.status(), ProtectionStatus::Unknown);

        monitor.record_success();
        assert_eq!(monitor.status(), ProtectionStatus::Protected);

        monitor.record_failure("refused");
        assert_eq!(monitor.status(), ProtectionStatus::Protected);

        monitor.record_failure("refused");
        assert_eq!(monitor.status(), ProtectionStatus::Limited);

        monitor.record_success();
        assert_eq!(monitor.status(), ProtectionStatus::Protected);

        monitor.reset();
        assert!(monitor.is_check_due());
        assert_eq!(monitor.status(), ProtectionStatus::Unknown);
    }

    #[test]
    fn recovery_needs_consecutive_successes() {
        let config = MonitorConfig::new()
            .with_success_threshold(2)
            .with_interval(Duration::ZERO);
        let mut monitor = ProtectionMonitor::new(config);

        monitor.record_failure("refused");
        assert_eq!(monitor.status(), ProtectionStatus::Limited);
        monitor.record_success();
        assert_eq!(monitor.status(), ProtectionStatus::Limited);
        monitor.record_success();
        assert_eq!(monitor.status(), ProtectionStatus::Protected);
        assert!(monitor.is_check_due());
    }

    #[tokio::test]
    async fn check_against_classifiers() {
        let mut monitor = ProtectionMonitor::default();
        assert_eq!(monitor.check(&MockClassifier::new()).await, ProtectionStatus::Protected);
        assert!(!monitor.is_check_due());

        assert_eq!(monitor.check(&NoClassifier).await, ProtectionStatus::Limited);
        let last = monitor.last_result().unwrap();
        assert!(last.message.is_some());

        let unhealthy = MockClassifier::new().unhealthy();
        assert_eq!(monitor.check(&unhealthy).await, ProtectionStatus::Limited);
    }
}
