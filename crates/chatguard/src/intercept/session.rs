//! One in-flight send attempt.

use std::fmt;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::state::{InterceptState, Resolution};
use crate::category::BuiltinCategory;
use crate::classifier::AugmentationStatus;
use crate::error::{GuardError, Result};
use crate::settings::Settings;

/// Identifier of an interception session. Ids increase monotonically per
/// interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A send attempt, from suppression to resolution.
#[derive(Debug, Clone)]
pub struct InterceptionSession {
    id: SessionId,
    original: String,
    settings: Settings,
    matches: Vec<BuiltinCategory>,
    state: InterceptState,
    augmentation: AugmentationStatus,
    resolution: Resolution,
    cancel: CancellationToken,
    opened_at: Instant,
}

impl InterceptionSession {
    /// Open a session in [`InterceptState::Gating`].
    pub(crate) fn open(id: SessionId, original: String, settings: Settings) -> Self {
        Self {
            id,
            original,
            settings,
            matches: Vec::new(),
            state: InterceptState::Gating,
            augmentation: AugmentationStatus::NotAttempted,
            resolution: Resolution::Pending,
            cancel: CancellationToken::new(),
            opened_at: Instant::now(),
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The text captured when the send was suppressed.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Settings captured when the session opened.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Enabled built-in categories whose patterns matched at gating.
    #[must_use]
    pub fn matches(&self) -> &[BuiltinCategory] {
        &self.matches
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> InterceptState {
        self.state
    }

    /// Classifier progress.
    #[must_use]
    pub const fn augmentation(&self) -> AugmentationStatus {
        self.augmentation
    }

    /// Resolution so far.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Time since the session opened.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }

    /// Check if the session was abandoned.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn abandon(&mut self) {
        self.cancel.cancel();
        if self.augmentation == AugmentationStatus::InFlight {
            self.augmentation = AugmentationStatus::Abandoned;
        }
    }

    pub(crate) fn set_matches(&mut self, matches: Vec<BuiltinCategory>) {
        self.matches = matches;
    }

    pub(crate) const fn set_augmentation(&mut self, status: AugmentationStatus) {
        self.augmentation = status;
    }

    pub(crate) const fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    /// Move to `next`, rejecting moves the machine does not allow.
    pub(crate) fn transition(&mut self, next: InterceptState, event: &'static str) -> Result<InterceptState> {
        if !self.state.can_transition_to(next) {
            return Err(GuardError::InvalidTransition {
                state: self.state,
                event,
            });
        }
        let previous = self.state;
        self.state = next;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::state::Terminal;

    fn session() -> InterceptionSession {
        let mut s = InterceptionSession::open(SessionId(1), "my id is 123456789012".into(), Settings::default());
        s.set_matches(vec![BuiltinCategory::NationalId]);
        s.transition(InterceptState::AwaitingDecision, "suspect").unwrap();
        s
    }

    #[test]
    fn opens_gating() {
        let s = InterceptionSession::open(SessionId(2), "hi".into(), Settings::default());
        assert_eq!(s.state(), InterceptState::Gating);
        assert!(s.matches().is_empty());
    }

    #[test]
    fn gated_session_awaits_decision() {
        let s = session();
        assert_eq!(s.state(), InterceptState::AwaitingDecision);
        assert_eq!(s.matches(), &[BuiltinCategory::NationalId]);
        assert_eq!(s.resolution(), Resolution::Pending);
        assert_eq!(s.augmentation(), AugmentationStatus::NotAttempted);
        assert_eq!(s.id().to_string(), "1");
    }

    #[test]
    fn rejects_invalid_transition() {
        let mut s = session();
        s.transition(InterceptState::Terminal(Terminal::Cancelled), "cancel").unwrap();
        let err = s.transition(InterceptState::Analyzing, "redact").unwrap_err();
        assert_eq!(err.to_string(), "cannot redact while in state cancelled");
    }

    #[test]
    fn abandon_marks_in_flight_call() {
        let mut s = session();
        s.set_augmentation(AugmentationStatus::InFlight);
        let token = s.cancel_token();
        s.abandon();
        assert!(token.is_cancelled());
        assert!(s.is_cancelled());
        assert_eq!(s.augmentation(), AugmentationStatus::Abandoned);
    }
}
