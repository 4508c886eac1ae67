//! States, decisions and resolutions of a send attempt.

use std::fmt;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// Text left (or was staged to leave) the user's control.
    Sent,
    /// Nothing was sent.
    Cancelled,
}

/// State of the interception machine.
///
/// ```text
/// Idle -> Gating -> AwaitingDecision -> Analyzing -> Resolving -> Terminal(Sent)
///           |              |--------------------------------------> Terminal(Sent)
///           v              `--------------------------------------> Terminal(Cancelled)
///          Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterceptState {
    /// No attempt in progress.
    #[default]
    Idle,
    /// Running the cheap pre-check.
    Gating,
    /// Suppressed; waiting for the user's decision.
    AwaitingDecision,
    /// Waiting on the classifier after a redact decision.
    Analyzing,
    /// Substituting and writing back.
    Resolving,
    /// Finished.
    Terminal(Terminal),
}

impl InterceptState {
    /// Whether the machine may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use InterceptState::{AwaitingDecision, Analyzing, Gating, Idle, Resolving};
        matches!(
            (self, next),
            (Idle, Gating)
                | (Gating, Idle | AwaitingDecision)
                | (AwaitingDecision, Analyzing | Self::Terminal(_))
                | (Analyzing, Resolving)
                | (Resolving, Self::Terminal(Terminal::Sent))
                | (Self::Terminal(_), Idle)
        )
    }

    /// Check if this is a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Check if a session in this state can be superseded.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::AwaitingDecision | Self::Analyzing)
    }

    /// Lowercase name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Gating => "gating",
            Self::AwaitingDecision => "awaiting-decision",
            Self::Analyzing => "analyzing",
            Self::Resolving => "resolving",
            Self::Terminal(Terminal::Sent) => "sent",
            Self::Terminal(Terminal::Cancelled) => "cancelled",
        }
    }
}

impl fmt::Display for InterceptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's answer to a pending session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Redact the text and write it back into the input.
    Redact,
    /// Send the original text unchanged.
    SendAsIs,
    /// Drop the attempt.
    Cancel,
}

impl Decision {
    /// Name of the event, as used by [`GuardError::InvalidTransition`](crate::GuardError::InvalidTransition).
    #[must_use]
    pub const fn event(self) -> &'static str {
        match self {
            Self::Redact => "redact",
            Self::SendAsIs => "send as is",
            Self::Cancel => "cancel",
        }
    }
}

/// A session's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    /// No decision yet.
    #[default]
    Pending,
    /// Redacted text written to the input.
    RedactAndSend,
    /// Original send synthesized.
    SendAsIs,
    /// Nothing sent.
    Cancelled,
}

impl Resolution {
    /// The resolution a decision leads to.
    #[must_use]
    pub const fn from_decision(decision: Decision) -> Self {
        match decision {
            Decision::Redact => Self::RedactAndSend,
            Decision::SendAsIs => Self::SendAsIs,
            Decision::Cancel => Self::Cancelled,
        }
    }
}
