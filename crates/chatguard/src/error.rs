//! Error types for chatguard.
//!
//! Most failures in this crate are deliberately *not* errors from the
//! caller's point of view: an unreachable classifier degrades a session to
//! regex-only protection, a superseded session is silently discarded and an
//! empty input is a no-op. The variants below exist so those conditions can
//! still be named, logged and reported as a status.

use std::time::Duration;

use thiserror::Error;

use crate::intercept::{InterceptState, SessionId};

/// The main error type for chatguard operations.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The classifier could not be reached or the transport failed.
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The classifier answered with a non-success status.
    #[error("classifier returned HTTP {status}")]
    ClassifierStatus {
        /// The HTTP status code returned.
        status: u16,
    },

    /// The classifier did not answer within the configured bound.
    #[error("classifier did not respond within {elapsed:?}")]
    ClassifierTimeout {
        /// The bound that elapsed.
        elapsed: Duration,
    },

    /// The classifier is disabled or not configured.
    #[error("classifier unavailable: {reason}")]
    ClassifierUnavailable {
        /// Why no classifier call was made.
        reason: String,
    },

    /// A JSON payload could not be encoded or decoded.
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML document could not be parsed.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// An I/O error occurred (settings or config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// No session with this id is known to the interceptor.
    #[error("no live interception session with id {id}")]
    UnknownSession {
        /// The requested session id.
        id: SessionId,
    },

    /// A session was superseded by a newer send attempt.
    #[error("session {id} was superseded by a newer send attempt")]
    Superseded {
        /// The superseded session id.
        id: SessionId,
    },

    /// The state machine rejected an event.
    #[error("cannot {event} while in state {state}")]
    InvalidTransition {
        /// State the session was in.
        state: InterceptState,
        /// The rejected event.
        event: &'static str,
    },

    /// The host's text-field or send primitive failed.
    #[error("input surface error: {message}")]
    Surface {
        /// Description supplied by the host.
        message: String,
    },
}

impl GuardError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a surface error.
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }

    /// Create a classifier-unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ClassifierUnavailable {
            reason: reason.into(),
        }
    }

    /// Check whether this error means "the classifier could not help".
    ///
    /// These failures are non-fatal: the session continues with structural
    /// patterns only and reports reduced protection.
    #[must_use]
    pub const fn is_classifier_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::ClassifierStatus { .. }
                | Self::ClassifierTimeout { .. }
                | Self::ClassifierUnavailable { .. }
                | Self::Json(_)
        )
    }

    /// Check whether this is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::ClassifierTimeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias for chatguard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_failures_are_classified() {
        assert!(GuardError::ClassifierStatus { status: 500 }.is_classifier_failure());
        assert!(GuardError::unavailable("disabled").is_classifier_failure());
        assert!(
            GuardError::ClassifierTimeout {
                elapsed: Duration::from_secs(3)
            }
            .is_classifier_failure()
        );
        assert!(!GuardError::config("bad").is_classifier_failure());
        assert!(!GuardError::UnknownSession { id: SessionId(4) }.is_classifier_failure());
    }

    #[test]
    fn timeout_detection() {
        let err = GuardError::ClassifierTimeout {
            elapsed: Duration::from_millis(10),
        };
        assert!(err.is_timeout());
        assert!(!GuardError::ClassifierStatus { status: 503 }.is_timeout());
    }

    #[test]
    fn display_messages() {
        let err = GuardError::InvalidTransition {
            state: InterceptState::Idle,
            event: "decide",
        };
        assert_eq!(err.to_string(), "cannot decide while in state idle");

        let err = GuardError::ClassifierStatus { status: 502 };
        assert_eq!(err.to_string(), "classifier returned HTTP 502");
    }
}
