//! Interception lifecycle events and observers.

use super::session::SessionId;
use super::state::{InterceptState, Resolution};
use crate::classifier::AugmentationStatus;

/// Something that happened to a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptEvent {
    /// A trigger was let through without a session.
    PassedThrough,
    /// A send was suppressed and a session opened.
    Opened {
        /// New session.
        id: SessionId,
        /// Length in bytes of the captured text.
        text_len: usize,
    },
    /// A session changed state.
    StateChanged {
        /// Session.
        id: SessionId,
        /// Previous state.
        from: InterceptState,
        /// New state.
        to: InterceptState,
    },
    /// A session was replaced by a newer attempt.
    Superseded {
        /// The abandoned session.
        id: SessionId,
        /// The session that replaced it.
        by: SessionId,
    },
    /// The classifier call of a session finished.
    AugmentationFinished {
        /// Session.
        id: SessionId,
        /// Outcome.
        status: AugmentationStatus,
    },
    /// A session reached its resolution.
    Resolved {
        /// Session.
        id: SessionId,
        /// Resolution.
        resolution: Resolution,
    },
}

/// Callback type for lifecycle events.
pub type InterceptCallback = Box<dyn Fn(InterceptEvent) + Send + Sync>;

/// Registered lifecycle observers.
#[derive(Default)]
pub struct Observers {
    callbacks: Vec<InterceptCallback>,
}

impl Observers {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn on_event(&mut self, callback: InterceptCallback) {
        self.callbacks.push(callback);
    }

    /// Deliver an event to every callback.
    pub fn emit(&self, event: &InterceptEvent) {
        for callback in &self.callbacks {
            callback(event.clone());
        }
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn emit_reaches_every_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::new();
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            observers.on_event(Box::new(move |event| seen.lock().unwrap().push(event)));
        }
        assert_eq!(observers.len(), 2);

        observers.emit(&InterceptEvent::PassedThrough);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(format!("{observers:?}").contains("callbacks: 2"));
    }
}
