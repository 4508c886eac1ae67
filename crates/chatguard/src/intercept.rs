//! Send interception.
//!
//! The [`Interceptor`] sits between the host's send triggers and the real
//! send. For every trigger it runs the cheap pre-check and, when the text
//! looks sensitive, suppresses the send and asks the user to redact, send
//! as is, or cancel.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatguard::prelude::*;
//!
//! let guard = Interceptor::new(classifier, input, decisions, hub.subscribe());
//!
//! if let TriggerOutcome::Suppressed(id) = guard.on_trigger(TriggerEvent::enter())? {
//!     // later, when the user clicks "redact":
//!     guard.decide(id, Decision::Redact).await?;
//! }
//! ```

mod lifecycle;
mod machine;
mod session;
mod state;
mod surface;

pub use lifecycle::{InterceptCallback, InterceptEvent, Observers};
pub use machine::{DecisionOutcome, Interceptor, TriggerOutcome};
pub use session::{InterceptionSession, SessionId};
pub use state::{Decision, InterceptState, Resolution, Terminal};
pub use surface::{DecisionSurface, InputSurface, TriggerEvent, TriggerSource};
