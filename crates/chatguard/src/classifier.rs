//! External classifier client.
//!
//! The classifier is the collaborator that turns free text into
//! `(literal, label)` entities the structural patterns cannot find: names,
//! organizations and locations. It is optional. Every call is bounded and
//! every failure degrades protection instead of blocking the send.

mod augmenter;
mod http;

use std::future::Future;

use crate::error::{GuardError, Result};
use crate::pii::Entity;

pub use augmenter::{Augmentation, AugmentationStatus, EntityAugmenter};
pub use http::{AnalyzeRequest, AnalyzeResponse, HttpClassifier};

/// An entity classifier.
pub trait Classifier: Send + Sync {
    /// Classify `text` into entities, in the classifier's own order.
    fn analyze(&self, text: &str) -> impl Future<Output = Result<Vec<Entity>>> + Send;

    /// Liveness probe. `Ok(false)` means the service answered but is not
    /// healthy.
    fn probe(&self) -> impl Future<Output = Result<bool>> + Send;
}

/// A classifier that is never available.
///
/// Used for regex-only deployments and when the classifier is disabled in
/// configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl Classifier for NoClassifier {
    async fn analyze(&self, _text: &str) -> Result<Vec<Entity>> {
        Err(GuardError::unavailable("no classifier configured"))
    }

    async fn probe(&self) -> Result<bool> {
        Ok(false)
    }
}

impl<C: Classifier> Classifier for std::sync::Arc<C> {
    fn analyze(&self, text: &str) -> impl Future<Output = Result<Vec<Entity>>> + Send {
        (**self).analyze(text)
    }

    fn probe(&self) -> impl Future<Output = Result<bool>> + Send {
        (**self).probe()
    }
}
