//! Entity augmentation with a bounded, cancellable classifier call.

use std::fmt;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::Classifier;
use crate::pii::Entity;
use crate::util::TimeoutExt;

/// Progress of a session's classifier call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AugmentationStatus {
    /// No call was made.
    #[default]
    NotAttempted,
    /// The call is outstanding.
    InFlight,
    /// Entities were obtained.
    Succeeded,
    /// The bound elapsed.
    FailedTimeout,
    /// Transport, status or payload failure.
    FailedError,
    /// The session was superseded before the call finished.
    Abandoned,
}

impl AugmentationStatus {
    /// Check if the classifier failed (timeout or error).
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::FailedTimeout | Self::FailedError)
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAttempted => "not-attempted",
            Self::InFlight => "in-flight",
            Self::Succeeded => "succeeded",
            Self::FailedTimeout => "failed-timeout",
            Self::FailedError => "failed-error",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for AugmentationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one augmentation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Augmentation {
    /// The classifier answered in time.
    Succeeded(Vec<Entity>),
    /// The classifier did not answer within the bound.
    FailedTimeout,
    /// The classifier failed; the message is for status reporting.
    FailedError(String),
    /// The session's token was cancelled.
    Abandoned,
    /// There was nothing to classify.
    NotAttempted,
}

impl Augmentation {
    /// The status this outcome records on a session.
    #[must_use]
    pub const fn status(&self) -> AugmentationStatus {
        match self {
            Self::Succeeded(_) => AugmentationStatus::Succeeded,
            Self::FailedTimeout => AugmentationStatus::FailedTimeout,
            Self::FailedError(_) => AugmentationStatus::FailedError,
            Self::Abandoned => AugmentationStatus::Abandoned,
            Self::NotAttempted => AugmentationStatus::NotAttempted,
        }
    }

    /// Entities obtained, empty unless the call succeeded.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        match self {
            Self::Succeeded(entities) => entities,
            _ => &[],
        }
    }

    /// Check if this outcome degrades protection to patterns only.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status().is_failure()
    }
}

/// Wraps a [`Classifier`] with the fixed per-call bound and cooperative
/// cancellation.
#[derive(Debug, Clone)]
pub struct EntityAugmenter<C> {
    classifier: C,
    timeout: Duration,
}

impl<C: Classifier> EntityAugmenter<C> {
    /// Create an augmenter with the default analyze bound.
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            timeout: crate::util::TimeoutConfig::default().analyze,
        }
    }

    /// Set the per-call bound.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-call bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The wrapped classifier.
    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classify `text`, giving up when `cancel` fires or the bound elapses.
    ///
    /// Never fails: every failure is folded into the returned outcome.
    pub async fn augment(&self, text: &str, cancel: &CancellationToken) -> Augmentation {
        if text.trim().is_empty() {
            return Augmentation::NotAttempted;
        }
        if cancel.is_cancelled() {
            return Augmentation::Abandoned;
        }

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Augmentation::Abandoned,
            result = self.classifier.analyze(text).with_timeout(self.timeout) => match result {
                Ok(Ok(entities)) => Augmentation::Succeeded(entities),
                Ok(Err(e)) if e.is_timeout() => Augmentation::FailedTimeout,
                Ok(Err(e)) => Augmentation::FailedError(e.to_string()),
                Err(_) => Augmentation::FailedTimeout,
            },
        };

        match &outcome {
            Augmentation::Succeeded(entities) => tracing::debug!(
                entities = entities.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "augmentation succeeded"
            ),
            Augmentation::FailedTimeout => tracing::warn!(
                bound_ms = self.timeout.as_millis() as u64,
                "classifier timed out, continuing with patterns only"
            ),
            Augmentation::FailedError(reason) => tracing::warn!(
                %reason,
                "classifier failed, continuing with patterns only"
            ),
            Augmentation::Abandoned => tracing::debug!("augmentation abandoned"),
            Augmentation::NotAttempted => {}
        }
        outcome
    }
}
