//! The interception state machine.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::lifecycle::{InterceptCallback, InterceptEvent, Observers};
use super::session::{InterceptionSession, SessionId};
use super::state::{Decision, InterceptState, Resolution, Terminal};
use super::surface::{DecisionSurface, InputSurface, TriggerEvent};
use crate::classifier::{Augmentation, AugmentationStatus, Classifier, EntityAugmenter};
use crate::error::{GuardError, Result};
use crate::health::ProtectionStatus;
use crate::metrics::{InterceptMetrics, Timer};
use crate::pii::{PatternDetector, RedactionPlan, might_contain_pii};
use crate::settings::Settings;

/// What the host should do with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Let the real send proceed.
    PassThrough,
    /// Prevent the real send; a session is awaiting a decision.
    Suppressed(SessionId),
}

impl TriggerOutcome {
    /// Check if the host must suppress the send.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }

    /// The opened session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<SessionId> {
        match self {
            Self::Suppressed(id) => Some(*id),
            Self::PassThrough => None,
        }
    }
}

/// Result of a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Redacted text was written into the input. Sending it is up to the
    /// user.
    Redacted {
        /// The text now in the input.
        text: String,
        /// How the classifier call went.
        augmentation: AugmentationStatus,
    },
    /// The original send was synthesized.
    SentAsIs,
    /// Nothing was sent.
    Cancelled,
    /// The session was replaced by a newer attempt; nothing was written.
    Superseded,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    current: Option<InterceptionSession>,
    last_resolved: Option<(SessionId, InterceptState)>,
    bypass: bool,
    /// Token of the in-place redaction awaiting the classifier, if any.
    selection: Option<CancellationToken>,
}

/// Orchestrates send attempts against one tracked input.
///
/// At most one session is live at a time. A trigger that arrives while a
/// session awaits a decision or analysis supersedes it: the old session's
/// classifier call is cancelled and its result never reaches the input.
///
/// The internal lock is never held across an `.await`.
pub struct Interceptor<C, I, D> {
    input: I,
    decisions: D,
    augmenter: EntityAugmenter<C>,
    detector: PatternDetector,
    settings: watch::Receiver<Settings>,
    inner: Mutex<Inner>,
    metrics: InterceptMetrics,
    observers: Observers,
}

impl<C, I, D> Interceptor<C, I, D>
where
    C: Classifier,
    I: InputSurface,
    D: DecisionSurface,
{
    /// Create an interceptor reading settings from `settings`.
    pub fn new(classifier: C, input: I, decisions: D, settings: watch::Receiver<Settings>) -> Self {
        Self {
            input,
            decisions,
            augmenter: EntityAugmenter::new(classifier),
            detector: PatternDetector,
            settings,
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            metrics: InterceptMetrics::new(),
            observers: Observers::new(),
        }
    }

    /// Set the bound on classifier calls.
    #[must_use]
    pub fn with_analyze_timeout(mut self, timeout: Duration) -> Self {
        self.augmenter = self.augmenter.with_timeout(timeout);
        self
    }

    /// Register a lifecycle observer.
    ///
    /// Observers run synchronously and must not call back into the
    /// interceptor.
    pub fn on_event(&mut self, callback: InterceptCallback) {
        self.observers.on_event(callback);
    }

    /// The tracked input.
    #[must_use]
    pub const fn input(&self) -> &I {
        &self.input
    }

    /// The decision surface.
    #[must_use]
    pub const fn decisions(&self) -> &D {
        &self.decisions
    }

    /// Counters.
    #[must_use]
    pub const fn metrics(&self) -> &InterceptMetrics {
        &self.metrics
    }

    /// State of the live session, or [`InterceptState::Idle`].
    #[must_use]
    pub fn state(&self) -> InterceptState {
        self.lock()
            .current
            .as_ref()
            .map_or(InterceptState::Idle, InterceptionSession::state)
    }

    /// A copy of the live session.
    #[must_use]
    pub fn current_session(&self) -> Option<InterceptionSession> {
        self.lock().current.clone()
    }

    /// Whether the selection toolbar should be offered.
    #[must_use]
    pub fn toolbar_enabled(&self) -> bool {
        self.settings.borrow().show_toolbar()
    }

    /// Whether the protection indicator should be shown.
    #[must_use]
    pub fn indicator_enabled(&self) -> bool {
        self.settings.borrow().show_lock_icon()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pass_through(&self) -> TriggerOutcome {
        self.metrics.passed_through();
        self.observers.emit(&InterceptEvent::PassedThrough);
        TriggerOutcome::PassThrough
    }

    fn transition(
        &self,
        session: &mut InterceptionSession,
        next: InterceptState,
        event: &'static str,
    ) -> Result<()> {
        let from = session.transition(next, event)?;
        self.observers.emit(&InterceptEvent::StateChanged {
            id: session.id(),
            from,
            to: next,
        });
        Ok(())
    }

    /// Handle a send trigger.
    ///
    /// Returns [`TriggerOutcome::Suppressed`] when the host must stop the
    /// real send. Empty input and text that passes the pre-check are let
    /// through.
    pub fn on_trigger(&self, event: TriggerEvent) -> Result<TriggerOutcome> {
        if !event.is_send_request() {
            return Ok(TriggerOutcome::PassThrough);
        }
        self.metrics.trigger();

        let mut inner = self.lock();
        if std::mem::take(&mut inner.bypass) {
            tracing::debug!("letting synthesized send through");
            return Ok(self.pass_through());
        }

        let text = match self.input.text() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "could not read input");
                self.decisions.report_status(ProtectionStatus::Error);
                return Err(e);
            }
        };

        let id = SessionId(inner.next_id);
        inner.next_id += 1;

        if let Some(token) = inner.selection.take() {
            token.cancel();
            tracing::debug!(by = %id, "in-place redaction overtaken by a send attempt");
        }

        if let Some(mut previous) = inner.current.take() {
            previous.abandon();
            self.decisions.dismiss(previous.id());
            self.metrics.superseded();
            self.observers.emit(&InterceptEvent::Superseded {
                id: previous.id(),
                by: id,
            });
            tracing::info!(session = %previous.id(), by = %id, "session superseded");
        }

        let Some(text) = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
        else {
            return Ok(self.pass_through());
        };

        let settings = self.settings.borrow().snapshot();
        let mut session = InterceptionSession::open(id, text, settings);
        self.observers.emit(&InterceptEvent::StateChanged {
            id,
            from: InterceptState::Idle,
            to: InterceptState::Gating,
        });

        if !might_contain_pii(session.original()) {
            tracing::debug!(text_len = session.original().len(), "nothing suspicious, passing through");
            self.transition(&mut session, InterceptState::Idle, "pass")?;
            return Ok(self.pass_through());
        }

        let matches = self
            .detector
            .matching_categories(session.original(), session.settings());
        session.set_matches(matches);

        tracing::info!(
            session = %id,
            text_len = session.original().len(),
            categories = session.matches().len(),
            "send suppressed"
        );
        self.observers.emit(&InterceptEvent::Opened {
            id,
            text_len: session.original().len(),
        });
        self.transition(&mut session, InterceptState::AwaitingDecision, "suspect")?;
        self.decisions.present(id, session.original());
        self.metrics.intercepted();
        inner.current = Some(session);

        Ok(TriggerOutcome::Suppressed(id))
    }

    /// Apply the user's decision to session `id`.
    ///
    /// Each session accepts one decision. Decisions for a superseded
    /// session are discarded and report [`DecisionOutcome::Superseded`].
    pub async fn decide(&self, id: SessionId, decision: Decision) -> Result<DecisionOutcome> {
        match decision {
            Decision::Cancel => self.cancel(id),
            Decision::SendAsIs => self.send_as_is(id),
            Decision::Redact => self.redact_then_hold(id).await,
        }
    }

    fn take_pending(
        inner: &mut Inner,
        id: SessionId,
        decision: Decision,
    ) -> Result<Option<InterceptionSession>> {
        match inner.current.take() {
            Some(session) if session.id() == id => {
                let state = session.state();
                if state == InterceptState::AwaitingDecision {
                    return Ok(Some(session));
                }
                inner.current = Some(session);
                Err(GuardError::InvalidTransition {
                    state,
                    event: decision.event(),
                })
            }
            other => {
                inner.current = other;
                match inner.last_resolved {
                    Some((resolved, state)) if resolved == id => Err(GuardError::InvalidTransition {
                        state,
                        event: decision.event(),
                    }),
                    _ if id.0 < inner.next_id => {
                        tracing::debug!(session = %id, "decision for superseded session ignored");
                        Ok(None)
                    }
                    _ => Err(GuardError::UnknownSession { id }),
                }
            }
        }
    }

    fn resolve(
        &self,
        inner: &mut Inner,
        mut session: InterceptionSession,
        terminal: Terminal,
        resolution: Resolution,
        event: &'static str,
    ) -> Result<()> {
        self.transition(&mut session, InterceptState::Terminal(terminal), event)?;
        session.set_resolution(resolution);
        inner.last_resolved = Some((session.id(), session.state()));
        self.observers.emit(&InterceptEvent::Resolved {
            id: session.id(),
            resolution,
        });
        tracing::info!(
            session = %session.id(),
            state = %session.state(),
            age_ms = session.age().as_millis() as u64,
            "session resolved"
        );
        Ok(())
    }

    fn cancel(&self, id: SessionId) -> Result<DecisionOutcome> {
        let mut inner = self.lock();
        let Some(session) = Self::take_pending(&mut inner, id, Decision::Cancel)? else {
            return Ok(DecisionOutcome::Superseded);
        };
        self.decisions.dismiss(id);
        self.resolve(
            &mut inner,
            session,
            Terminal::Cancelled,
            Resolution::from_decision(Decision::Cancel),
            Decision::Cancel.event(),
        )?;
        self.metrics.cancelled();
        Ok(DecisionOutcome::Cancelled)
    }

    fn send_as_is(&self, id: SessionId) -> Result<DecisionOutcome> {
        {
            let mut inner = self.lock();
            let Some(session) = Self::take_pending(&mut inner, id, Decision::SendAsIs)? else {
                return Ok(DecisionOutcome::Superseded);
            };
            self.decisions.dismiss(id);
            self.resolve(
                &mut inner,
                session,
                Terminal::Sent,
                Resolution::from_decision(Decision::SendAsIs),
                Decision::SendAsIs.event(),
            )?;
            inner.bypass = true;
        }
        self.metrics.sent_as_is();

        // The bypass covers a trigger raised from inside dispatch_send.
        let dispatched = self.input.dispatch_send();
        self.lock().bypass = false;
        if let Err(e) = dispatched {
            tracing::warn!(session = %id, error = %e, "synthesized send failed");
            self.decisions.report_status(ProtectionStatus::Error);
            return Err(e);
        }
        Ok(DecisionOutcome::SentAsIs)
    }

    async fn redact_then_hold(&self, id: SessionId) -> Result<DecisionOutcome> {
        let (text, token) = {
            let mut inner = self.lock();
            let Some(mut session) = Self::take_pending(&mut inner, id, Decision::Redact)? else {
                return Ok(DecisionOutcome::Superseded);
            };
            self.decisions.dismiss(id);
            self.transition(&mut session, InterceptState::Analyzing, Decision::Redact.event())?;
            session.set_augmentation(AugmentationStatus::InFlight);
            let captured = (session.original().to_string(), session.cancel_token());
            inner.current = Some(session);
            captured
        };

        let timer = Timer::start();
        let augmentation = self.augmenter.augment(&text, &token).await;

        let mut inner = self.lock();
        let mut session = match inner.current.take() {
            Some(session) if session.id() == id && !token.is_cancelled() => session,
            other => {
                inner.current = other;
                tracing::debug!(session = %id, "discarding analysis of superseded session");
                return Ok(DecisionOutcome::Superseded);
            }
        };

        session.set_augmentation(augmentation.status());
        self.observers.emit(&InterceptEvent::AugmentationFinished {
            id,
            status: augmentation.status(),
        });
        self.transition(&mut session, InterceptState::Resolving, "resolve")?;

        let redaction = RedactionPlan::build(session.settings(), augmentation.entities()).apply(&text);
        if let Err(e) = self.input.replace_text(&redaction.text) {
            tracing::warn!(session = %id, error = %e, "could not write redacted text");
            inner.last_resolved = Some((id, session.state()));
            self.metrics.live_sessions.dec();
            self.decisions.report_status(ProtectionStatus::Error);
            return Err(e);
        }

        self.resolve(
            &mut inner,
            session,
            Terminal::Sent,
            Resolution::from_decision(Decision::Redact),
            "resolve",
        )?;
        drop(inner);

        self.report_augmentation(&augmentation);
        self.metrics.redacted(timer.elapsed());
        tracing::debug!(
            session = %id,
            replaced = redaction.total(),
            augmentation = %augmentation.status(),
            "redacted text written"
        );

        Ok(DecisionOutcome::Redacted {
            text: redaction.text,
            augmentation: augmentation.status(),
        })
    }

    fn report_augmentation(&self, augmentation: &Augmentation) {
        match augmentation {
            Augmentation::Succeeded(_) => self.decisions.report_status(ProtectionStatus::Protected),
            Augmentation::FailedTimeout | Augmentation::FailedError(_) => {
                self.metrics
                    .classifier_failure(matches!(augmentation, Augmentation::FailedTimeout));
                self.decisions.report_status(ProtectionStatus::Limited);
            }
            Augmentation::Abandoned | Augmentation::NotAttempted => {}
        }
    }

    /// Redact a selection in place, without sending.
    ///
    /// Blank selections are a no-op and return `None`. A send trigger or a
    /// newer in-place redaction arriving while the classifier is consulted
    /// abandons this one: nothing is written and `None` is returned.
    pub async fn redact_in_place(&self, selection: &str) -> Result<Option<String>> {
        if selection.trim().is_empty() {
            return Ok(None);
        }
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().selection.replace(token.clone()) {
            previous.cancel();
        }
        let settings = self.settings.borrow().snapshot();
        let augmentation = self.augmenter.augment(selection, &token).await;

        let mut inner = self.lock();
        if token.is_cancelled() {
            tracing::debug!(text_len = selection.len(), "discarding overtaken in-place redaction");
            return Ok(None);
        }
        inner.selection = None;

        let redaction = RedactionPlan::build(&settings, augmentation.entities()).apply(selection);
        self.input.replace_selection(&redaction.text)?;
        drop(inner);
        self.report_augmentation(&augmentation);
        tracing::debug!(
            text_len = selection.len(),
            replaced = redaction.total(),
            "selection redacted in place"
        );
        Ok(Some(redaction.text))
    }
}

impl<C, I, D> std::fmt::Debug for Interceptor<C, I, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Interceptor")
            .field("current", &inner.current.as_ref().map(InterceptionSession::id))
            .field("next_id", &inner.next_id)
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use super::*;
    use crate::category::BuiltinCategory;
    use crate::pii::Entity;
    use crate::test_utils::{DecisionCall, MockClassifier, RecordingDecisions, RecordingInput};

    type TestInterceptor = Interceptor<MockClassifier, RecordingInput, RecordingDecisions>;

    fn interceptor(classifier: MockClassifier, text: &str) -> (TestInterceptor, watch::Sender<Settings>) {
        let (tx, rx) = watch::channel(Settings::default());
        let interceptor = Interceptor::new(
            classifier,
            RecordingInput::with_text(text),
            RecordingDecisions::new(),
            rx,
        );
        (interceptor, tx)
    }

    #[tokio::test]
    async fn clean_text_passes_through() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "hello there");
        let outcome = guard.on_trigger(TriggerEvent::enter()).unwrap();
        assert_eq!(outcome, TriggerOutcome::PassThrough);
        assert_eq!(guard.state(), InterceptState::Idle);
        assert!(guard.decisions().calls().is_empty());
        assert_eq!(guard.metrics().snapshot().passed_through, 1);
    }

    #[tokio::test]
    async fn empty_or_missing_input_is_a_no_op() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "   ");
        assert_eq!(guard.on_trigger(TriggerEvent::enter()).unwrap(), TriggerOutcome::PassThrough);

        guard.input().clear();
        assert_eq!(guard.on_trigger(TriggerEvent::send_control()).unwrap(), TriggerOutcome::PassThrough);
    }

    #[tokio::test]
    async fn shift_enter_and_unfocused_keys_are_ignored() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "my id is 123456789012");
        assert!(!guard.on_trigger(TriggerEvent::shift_enter()).unwrap().is_suppressed());
        assert!(!guard.on_trigger(TriggerEvent::enter().with_focus(false)).unwrap().is_suppressed());
        assert_eq!(guard.metrics().snapshot().triggers, 0);
    }

    #[tokio::test]
    async fn suspicious_text_is_suppressed() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "  my id is 123456789012 ");
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        assert_eq!(guard.state(), InterceptState::AwaitingDecision);
        let session = guard.current_session().unwrap();
        assert_eq!(session.original(), "my id is 123456789012");
        assert_eq!(session.matches(), [BuiltinCategory::NationalId]);
        assert_eq!(
            guard.decisions().calls(),
            vec![DecisionCall::Present {
                id,
                original: "my id is 123456789012".into()
            }]
        );
    }

    #[tokio::test]
    async fn redact_writes_back_without_sending() {
        let classifier = MockClassifier::new().with_entities(vec![Entity::new("John Smith", "PERSON")]);
        let (guard, _tx) = interceptor(classifier, "John Smith, id 123456789012");
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        let outcome = guard.decide(id, Decision::Redact).await.unwrap();
        assert_eq!(
            outcome,
            DecisionOutcome::Redacted {
                text: "[PERSON], id [ИИН]".into(),
                augmentation: AugmentationStatus::Succeeded,
            }
        );
        assert_eq!(guard.input().text_value().as_deref(), Some("[PERSON], id [ИИН]"));
        assert_eq!(guard.input().sends(), 0);
        assert_eq!(guard.state(), InterceptState::Idle);
        assert_eq!(guard.decisions().last_status(), Some(ProtectionStatus::Protected));

        // Pressing send again with the redacted text goes through.
        assert_eq!(guard.on_trigger(TriggerEvent::enter()).unwrap(), TriggerOutcome::PassThrough);
    }

    #[tokio::test]
    async fn classifier_timeout_degrades_to_patterns() {
        let classifier = MockClassifier::new()
            .with_entities(vec![Entity::new("John", "PERSON")])
            .with_delay(Duration::from_secs(30));
        let (guard, _tx) = interceptor(classifier, "John: my id is 123456789012");
        let guard = guard.with_analyze_timeout(Duration::from_millis(20));
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        let outcome = guard.decide(id, Decision::Redact).await.unwrap();
        assert_eq!(
            outcome,
            DecisionOutcome::Redacted {
                text: "John: my id is [ИИН]".into(),
                augmentation: AugmentationStatus::FailedTimeout,
            }
        );
        assert_eq!(guard.decisions().last_status(), Some(ProtectionStatus::Limited));
        assert_eq!(guard.metrics().snapshot().classifier_failures, 1);
    }

    #[tokio::test]
    async fn cancel_leaves_input_untouched() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        assert_eq!(guard.decide(id, Decision::Cancel).await.unwrap(), DecisionOutcome::Cancelled);
        assert_eq!(guard.input().text_value().as_deref(), Some("contact a@b.com"));
        assert!(guard.input().replacements().is_empty());
        assert_eq!(guard.input().sends(), 0);
        assert!(guard.decisions().calls().contains(&DecisionCall::Dismiss(id)));
    }

    #[tokio::test]
    async fn one_decision_per_session() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        guard.decide(id, Decision::Cancel).await.unwrap();

        let err = guard.decide(id, Decision::Redact).await.unwrap_err();
        assert!(matches!(err, GuardError::InvalidTransition { .. }));
        assert_eq!(err.to_string(), "cannot redact while in state cancelled");

        let err = guard.decide(SessionId(99), Decision::Cancel).await.unwrap_err();
        assert!(matches!(err, GuardError::UnknownSession { .. }));
    }

    #[tokio::test]
    async fn send_as_is_dispatches_once() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        assert_eq!(guard.decide(id, Decision::SendAsIs).await.unwrap(), DecisionOutcome::SentAsIs);
        assert_eq!(guard.input().sends(), 1);
        assert_eq!(guard.input().text_value().as_deref(), Some("contact a@b.com"));
        assert_eq!(guard.metrics().snapshot().sent_as_is, 1);

        // The bypass does not outlive the synthesized send.
        assert!(guard.on_trigger(TriggerEvent::enter()).unwrap().is_suppressed());
    }

    #[tokio::test]
    async fn synthesized_send_is_not_intercepted_again() {
        let (tx, rx) = watch::channel(Settings::default());
        let input = RecordingInput::with_text("contact a@b.com");
        let guard = Arc::new(Interceptor::new(
            MockClassifier::new(),
            input.clone(),
            RecordingDecisions::new(),
            rx,
        ));

        let reentrant: Weak<TestInterceptor> = Arc::downgrade(&guard);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        input.on_dispatch(move || {
            if let Some(guard) = reentrant.upgrade() {
                let outcome = guard.on_trigger(TriggerEvent::send_control()).unwrap();
                sink.lock().unwrap().push(outcome);
            }
        });

        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        guard.decide(id, Decision::SendAsIs).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![TriggerOutcome::PassThrough]);
        assert_eq!(input.sends(), 1);
        drop(tx);
    }

    #[tokio::test]
    async fn superseded_analysis_never_writes() {
        let classifier = MockClassifier::new()
            .with_entities(vec![Entity::new("Alice", "PERSON")])
            .gated();
        let (guard, _tx) = interceptor(classifier.clone(), "Alice: 123456789012");
        let guard = Arc::new(guard);

        let first = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        let pending = {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.decide(first, Decision::Redact).await })
        };
        classifier.wait_for_call().await;
        assert_eq!(guard.state(), InterceptState::Analyzing);

        guard.input().set_text("Bob: a@b.com");
        let second = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        assert_ne!(first, second);

        classifier.release();
        assert_eq!(pending.await.unwrap().unwrap(), DecisionOutcome::Superseded);
        assert!(guard.input().replacements().is_empty());
        assert_eq!(guard.input().text_value().as_deref(), Some("Bob: a@b.com"));

        classifier.release();
        let outcome = guard.decide(second, Decision::Redact).await.unwrap();
        assert!(matches!(outcome, DecisionOutcome::Redacted { ref text, .. } if text == "Bob: [EMAIL]"));
        assert_eq!(guard.input().replacements(), vec!["Bob: [EMAIL]".to_string()]);
        assert_eq!(guard.metrics().snapshot().superseded, 1);
    }

    #[tokio::test]
    async fn late_decision_for_superseded_session_is_discarded() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        let first = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        let second = guard.on_trigger(TriggerEvent::send_control()).unwrap().session().unwrap();

        assert_eq!(guard.decide(first, Decision::SendAsIs).await.unwrap(), DecisionOutcome::Superseded);
        assert_eq!(guard.input().sends(), 0);
        assert_eq!(guard.current_session().unwrap().id(), second);
    }

    #[tokio::test]
    async fn settings_apply_to_the_next_attempt() {
        let (guard, tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        let first = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        tx.send_replace(Settings::default().with(BuiltinCategory::Email, false));
        let outcome = guard.decide(first, Decision::Redact).await.unwrap();
        assert!(matches!(outcome, DecisionOutcome::Redacted { ref text, .. } if text == "contact [EMAIL]"));

        guard.input().set_text("contact a@b.com");
        let second = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        let outcome = guard.decide(second, Decision::Redact).await.unwrap();
        assert!(matches!(outcome, DecisionOutcome::Redacted { ref text, .. } if text == "contact a@b.com"));
    }

    #[tokio::test]
    async fn gating_ignores_configuration() {
        let (tx, rx) = watch::channel(Settings::default());
        let mut none = Settings::default();
        none.deselect_all();
        tx.send_replace(none);

        let guard = Interceptor::new(
            MockClassifier::new(),
            RecordingInput::with_text("id 123456789012"),
            RecordingDecisions::new(),
            rx,
        );
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        assert!(guard.current_session().unwrap().matches().is_empty());

        let outcome = guard.decide(id, Decision::Redact).await.unwrap();
        assert!(matches!(outcome, DecisionOutcome::Redacted { ref text, .. } if text == "id 123456789012"));
    }

    #[tokio::test]
    async fn redact_in_place_replaces_selection() {
        let classifier = MockClassifier::new().failing(503);
        let (guard, _tx) = interceptor(classifier, "");

        assert_eq!(guard.redact_in_place("  ").await.unwrap(), None);
        let out = guard.redact_in_place("mail a@b.com").await.unwrap();
        assert_eq!(out.as_deref(), Some("mail [EMAIL]"));
        assert_eq!(guard.input().selection_replacements(), vec!["mail [EMAIL]".to_string()]);
        assert_eq!(guard.input().sends(), 0);
        assert_eq!(guard.decisions().last_status(), Some(ProtectionStatus::Limited));
    }

    #[tokio::test]
    async fn observers_see_the_lifecycle() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        let mut guard = guard;
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        guard.on_event(Box::new(move |event| sink.lock().unwrap().push(event)));

        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        guard.decide(id, Decision::Redact).await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            events[..3],
            [
                InterceptEvent::StateChanged {
                    id,
                    from: InterceptState::Idle,
                    to: InterceptState::Gating
                },
                InterceptEvent::Opened { id, text_len: 15 },
                InterceptEvent::StateChanged {
                    id,
                    from: InterceptState::Gating,
                    to: InterceptState::AwaitingDecision
                },
            ]
        );
        assert!(events.contains(&InterceptEvent::AugmentationFinished {
            id,
            status: AugmentationStatus::Succeeded
        }));
        assert_eq!(
            events.last(),
            Some(&InterceptEvent::Resolved {
                id,
                resolution: Resolution::RedactAndSend
            })
        );
    }

    #[tokio::test]
    async fn send_attempt_overtakes_in_place_redaction() {
        let classifier = MockClassifier::new()
            .with_entities(vec![Entity::new("Alice", "PERSON")])
            .gated();
        let (guard, _tx) = interceptor(classifier.clone(), "contact a@b.com");
        let guard = Arc::new(guard);

        let pending = {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.redact_in_place("Alice a@b.com").await })
        };
        classifier.wait_for_call().await;

        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();
        assert_eq!(pending.await.unwrap().unwrap(), None);
        assert!(guard.input().selection_replacements().is_empty());
        assert_eq!(guard.current_session().unwrap().id(), id);

        classifier.release();
        let out = guard.redact_in_place("Alice a@b.com").await.unwrap();
        assert_eq!(out.as_deref(), Some("[PERSON] [EMAIL]"));
        assert_eq!(guard.input().selection_replacements(), vec!["[PERSON] [EMAIL]".to_string()]);
    }

    #[tokio::test]
    async fn clean_text_gates_back_to_idle() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "hello there");
        let mut guard = guard;
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        guard.on_event(Box::new(move |event| sink.lock().unwrap().push(event)));

        assert_eq!(guard.on_trigger(TriggerEvent::enter()).unwrap(), TriggerOutcome::PassThrough);

        let id = SessionId(1);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                InterceptEvent::StateChanged {
                    id,
                    from: InterceptState::Idle,
                    to: InterceptState::Gating
                },
                InterceptEvent::StateChanged {
                    id,
                    from: InterceptState::Gating,
                    to: InterceptState::Idle
                },
                InterceptEvent::PassedThrough,
            ]
        );
        assert!(guard.current_session().is_none());
    }

    #[tokio::test]
    async fn presentation_flags_follow_settings() {
        let (guard, tx) = interceptor(MockClassifier::new(), "");
        assert!(guard.toolbar_enabled());
        assert!(guard.indicator_enabled());

        let mut settings = Settings::default();
        settings.set_show_toolbar(false);
        tx.send_replace(settings);
        assert!(!guard.toolbar_enabled());
        assert!(guard.indicator_enabled());
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let (guard, _tx) = interceptor(MockClassifier::new(), "contact a@b.com");
        guard.input().fail_writes(true);
        let id = guard.on_trigger(TriggerEvent::enter()).unwrap().session().unwrap();

        let err = guard.decide(id, Decision::Redact).await.unwrap_err();
        assert!(matches!(err, GuardError::Surface { .. }));
        assert_eq!(guard.decisions().last_status(), Some(ProtectionStatus::Error));
        assert_eq!(guard.state(), InterceptState::Idle);
    }
}
