//! Scriptable classifier.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

use crate::classifier::Classifier;
use crate::error::{GuardError, Result};
use crate::pii::Entity;

/// A classifier whose answers are scripted.
///
/// Clones share the call counter and the gate, so a test can keep a clone
/// to observe and release calls made through the interceptor.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    entities: Vec<Entity>,
    failure: Option<u16>,
    delay: Option<Duration>,
    healthy: bool,
    gate: Option<Arc<Notify>>,
    started: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// A healthy classifier that finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            failure: None,
            delay: None,
            healthy: true,
            gate: None,
            started: Arc::new(Notify::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer every call with `entities`.
    #[must_use]
    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    /// Answer every call with HTTP `status`.
    #[must_use]
    pub const fn failing(mut self, status: u16) -> Self {
        self.failure = Some(status);
        self
    }

    /// Sleep before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every call until [`release`](Self::release).
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Report unhealthy from the probe.
    #[must_use]
    pub const fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Let one gated call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Wait until a call has started.
    pub async fn wait_for_call(&self) {
        self.started.notified().await;
    }

    /// Number of `analyze` calls made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    async fn analyze(&self, _text: &str) -> Result<Vec<Entity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure {
            Some(status) => Err(GuardError::ClassifierStatus { status }),
            None => Ok(self.entities.clone()),
        }
    }

    async fn probe(&self) -> Result<bool> {
        Ok(self.healthy)
    }
}
