//! Events multiplexed by the flow driver.

use tokio::sync::oneshot;

use crate::flow::form::IdentifierKind;
use crate::flow::SubmitOutcome;
use crate::services::{ApiError, UserProfile};

/// Everything the driver's event loop reacts to: presentation-layer events
/// arriving through the handle, plus completions of the checks it dispatched
/// itself.
pub enum FlowEvent {
    /// The input value or identifier kind changed.
    InputChanged {
        value: String,
        kind: IdentifierKind,
    },
    /// Explicit submit action.
    Submit {
        reply: oneshot::Sender<SubmitOutcome>,
    },
    /// The external OTP entry sub-flow reported success; replies with the
    /// redirect target.
    OtpSucceeded { reply: oneshot::Sender<String> },
    /// The external OTP entry sub-flow reported failure; acknowledged once
    /// the reset and re-arm have completed.
    OtpFailed { reply: oneshot::Sender<()> },
    /// A dispatched existence check finished.
    LookupDone {
        generation: u64,
        result: Result<Option<UserProfile>, ApiError>,
    },
    /// Stop the event loop.
    Shutdown,
}
