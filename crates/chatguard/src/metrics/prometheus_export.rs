//! Prometheus metrics export.
//!
//! ```rust,ignore
//! use chatguard::metrics::prometheus_export::gather_metrics;
//!
//! // In the handler for a /metrics endpoint:
//! fn metrics_handler() -> String {
//!     gather_metrics()
//! }
//! ```

use std::sync::OnceLock;

use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

static REGISTRY: OnceLock<Registry> = OnceLock::new();

static METRICS: OnceLock<Option<GuardMetrics>> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Prometheus metrics for the interception workflow.
#[derive(Debug, Clone)]
pub struct GuardMetrics {
    triggers_total: Counter,
    sessions_live: Gauge,
    sessions_total: CounterVec,
    analysis_duration: Histogram,
    classifier_failures_total: CounterVec,
}

impl GuardMetrics {
    /// The global instance, registered on first use.
    ///
    /// `None` if registration failed; the failure is logged once.
    pub fn global() -> Option<&'static Self> {
        METRICS
            .get_or_init(|| match Self::new(registry()) {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to register prometheus metrics");
                    None
                }
            })
            .as_ref()
    }

    /// Create metrics registered with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let triggers_total = Counter::with_opts(Opts::new(
            "chatguard_triggers_total",
            "Send triggers observed",
        ))?;
        registry.register(Box::new(triggers_total.clone()))?;

        let sessions_live = Gauge::with_opts(Opts::new(
            "chatguard_sessions_live",
            "Interception sessions awaiting a decision or analysis",
        ))?;
        registry.register(Box::new(sessions_live.clone()))?;

        let sessions_total = CounterVec::new(
            Opts::new("chatguard_sessions_total", "Send attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(sessions_total.clone()))?;

        let analysis_duration = Histogram::with_opts(
            HistogramOpts::new(
                "chatguard_analysis_duration_seconds",
                "Time from redact decision to redacted text",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0]),
        )?;
        registry.register(Box::new(analysis_duration.clone()))?;

        let classifier_failures_total = CounterVec::new(
            Opts::new(
                "chatguard_classifier_failures_total",
                "Classifier calls that degraded protection",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(classifier_failures_total.clone()))?;

        Ok(Self {
            triggers_total,
            sessions_live,
            sessions_total,
            analysis_duration,
            classifier_failures_total,
        })
    }

    /// Record a trigger.
    pub fn trigger(&self) {
        self.triggers_total.inc();
    }

    /// Record a non-session outcome such as a pass-through.
    pub fn outcome(&self, outcome: &str) {
        self.sessions_total.with_label_values(&[outcome]).inc();
    }

    /// Record a session opening.
    pub fn session_opened(&self) {
        self.sessions_live.inc();
    }

    /// Record a session closing with `outcome`.
    pub fn session_closed(&self, outcome: &str) {
        self.sessions_live.dec();
        self.outcome(outcome);
    }

    /// Record how long a redact decision took to resolve.
    pub fn analysis_finished(&self, seconds: f64) {
        self.analysis_duration.observe(seconds);
    }

    /// Record a classifier failure of `kind` (`timeout` or `error`).
    pub fn classifier_failure(&self, kind: &str) {
        self.classifier_failures_total.with_label_values(&[kind]).inc();
    }

    /// Total triggers recorded.
    #[must_use]
    pub fn total_triggers(&self) -> u64 {
        self.triggers_total.get() as u64
    }

    /// Sessions currently live.
    #[must_use]
    pub fn live_sessions(&self) -> u64 {
        self.sessions_live.get().max(0.0) as u64
    }
}

/// Gather the global registry in Prometheus text format.
#[must_use]
pub fn gather_metrics() -> String {
    encode(registry())
}

/// Encode any registry in Prometheus text format.
#[must_use]
pub fn encode(registry: &Registry) -> String {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}

/// The global registry, for integration with an existing exporter.
#[must_use]
pub fn global_registry() -> &'static Registry {
    registry()
}
