//! Host-facing seams: the tracked input and the decision surface.
//!
//! Implementations are called synchronously, some of them while the
//! interceptor holds its internal lock. They must not call back into the
//! interceptor, with the single exception of the send synthesized by
//! [`InputSurface::dispatch_send`].

use super::session::SessionId;
use crate::error::Result;
use crate::health::ProtectionStatus;

/// The chat input being protected.
pub trait InputSurface: Send + Sync {
    /// Current contents of the input. `None` when the input is missing.
    fn text(&self) -> Result<Option<String>>;

    /// Replace the whole contents.
    fn replace_text(&self, text: &str) -> Result<()>;

    /// Replace the current selection.
    fn replace_selection(&self, text: &str) -> Result<()>;

    /// Fire the host's real send action once.
    fn dispatch_send(&self) -> Result<()>;
}

/// The presentation layer that asks the user what to do.
pub trait DecisionSurface: Send + Sync {
    /// Show the three choices for a suppressed send.
    fn present(&self, id: SessionId, original: &str);

    /// Withdraw the choices for a session.
    fn dismiss(&self, id: SessionId);

    /// Show the current protection level.
    fn report_status(&self, status: ProtectionStatus);
}

/// Where a send trigger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// The activation key (Enter).
    ActivationKey {
        /// Whether Shift was held; Shift+Enter inserts a newline.
        shift: bool,
    },
    /// The host's send control.
    SendControl,
}

/// A send trigger observed on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerEvent {
    /// Origin of the trigger.
    pub source: TriggerSource,
    /// Whether the tracked input had focus.
    pub focused: bool,
}

impl TriggerEvent {
    /// Enter pressed in the focused input.
    #[must_use]
    pub const fn enter() -> Self {
        Self {
            source: TriggerSource::ActivationKey { shift: false },
            focused: true,
        }
    }

    /// Shift+Enter pressed in the focused input.
    #[must_use]
    pub const fn shift_enter() -> Self {
        Self {
            source: TriggerSource::ActivationKey { shift: true },
            focused: true,
        }
    }

    /// The send control was activated.
    #[must_use]
    pub const fn send_control() -> Self {
        Self {
            source: TriggerSource::SendControl,
            focused: true,
        }
    }

    /// Set whether the input had focus.
    #[must_use]
    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Check if this event asks for a send at all.
    ///
    /// Shift+Enter and keys pressed outside the tracked input do not.
    #[must_use]
    pub const fn is_send_request(&self) -> bool {
        match self.source {
            TriggerSource::ActivationKey { shift } => !shift && self.focused,
            TriggerSource::SendControl => true,
        }
    }
}
