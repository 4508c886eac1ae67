//! Recording host surfaces.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{GuardError, Result};
use crate::health::ProtectionStatus;
use crate::intercept::{DecisionSurface, InputSurface, SessionId};

type DispatchHook = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct InputState {
    text: Option<String>,
    replacements: Vec<String>,
    selections: Vec<String>,
    sends: usize,
    fail_writes: bool,
}

/// An in-memory chat input that records every write and send.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct RecordingInput {
    state: Arc<Mutex<InputState>>,
    hook: Arc<OnceLock<DispatchHook>>,
}

impl RecordingInput {
    /// An input with no element (missing field).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An input containing `text`.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        let input = Self::default();
        input.set_text(text);
        input
    }

    fn state(&self) -> MutexGuard<'_, InputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the contents, as if the user typed.
    pub fn set_text(&self, text: impl Into<String>) {
        self.state().text = Some(text.into());
    }

    /// Remove the field.
    pub fn clear(&self) {
        self.state().text = None;
    }

    /// Make every write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Run `hook` inside every [`dispatch_send`](InputSurface::dispatch_send).
    /// Only the first hook is kept.
    pub fn on_dispatch(&self, hook: impl Fn() + Send + Sync + 'static) {
        let _ = self.hook.set(Box::new(hook));
    }

    /// Current contents.
    #[must_use]
    pub fn text_value(&self) -> Option<String> {
        self.state().text.clone()
    }

    /// Every whole-field write, in order.
    #[must_use]
    pub fn replacements(&self) -> Vec<String> {
        self.state().replacements.clone()
    }

    /// Every selection write, in order.
    #[must_use]
    pub fn selection_replacements(&self) -> Vec<String> {
        self.state().selections.clone()
    }

    /// Number of synthesized sends.
    #[must_use]
    pub fn sends(&self) -> usize {
        self.state().sends
    }
}

impl InputSurface for RecordingInput {
    fn text(&self) -> Result<Option<String>> {
        Ok(self.text_value())
    }

    fn replace_text(&self, text: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(GuardError::surface("input is read-only"));
        }
        state.text = Some(text.to_string());
        state.replacements.push(text.to_string());
        Ok(())
    }

    fn replace_selection(&self, text: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(GuardError::surface("input is read-only"));
        }
        state.selections.push(text.to_string());
        Ok(())
    }

    fn dispatch_send(&self) -> Result<()> {
        self.state().sends += 1;
        if let Some(hook) = self.hook.get() {
            hook();
        }
        Ok(())
    }
}

impl std::fmt::Debug for RecordingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingInput")
            .field("state", &*self.state())
            .field("hook", &self.hook.get().is_some())
            .finish()
    }
}

/// A call made to the decision surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionCall {
    /// Choices shown.
    Present {
        /// Session.
        id: SessionId,
        /// Text shown to the user.
        original: String,
    },
    /// Choices withdrawn.
    Dismiss(SessionId),
    /// Protection status reported.
    Status(ProtectionStatus),
}

/// A decision surface that records every call.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingDecisions {
    calls: Arc<Mutex<Vec<DecisionCall>>>,
}

impl RecordingDecisions {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: DecisionCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Every call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DecisionCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sessions that were presented, in order.
    #[must_use]
    pub fn presented(&self) -> Vec<SessionId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DecisionCall::Present { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    /// The latest reported status.
    #[must_use]
    pub fn last_status(&self) -> Option<ProtectionStatus> {
        self.calls().into_iter().rev().find_map(|call| match call {
            DecisionCall::Status(status) => Some(status),
            _ => None,
        })
    }
}

impl DecisionSurface for RecordingDecisions {
    fn present(&self, id: SessionId, original: &str) {
        self.push(DecisionCall::Present {
            id,
            original: original.to_string(),
        });
    }

    fn dismiss(&self, id: SessionId) {
        self.push(DecisionCall::Dismiss(id));
    }

    fn report_status(&self, status: ProtectionStatus) {
        self.push(DecisionCall::Status(status));
    }
}
