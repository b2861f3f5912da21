//! Outcome routing
//!
//! The single place where delivery races cancellation and shutdown,
//! instead of re-deriving the race at every call site.

use contracts::WriteOutcome;

use crate::context::ShutdownSignal;
use crate::request::PendingRequest;

/// What happened to one outcome. Exactly one variant occurs per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered into the caller's reply slot
    Delivered,
    /// Caller raised its cancel token first, outcome dropped
    Cancelled,
    /// Shutdown was raised first, outcome dropped
    ShuttingDown,
    /// Caller vanished without cancelling, outcome dropped
    Abandoned,
}

/// Route one outcome back to its originating caller.
///
/// Nothing here suspends: the reply slot accepts at most one value and
/// the checks are plain reads, so a departed caller can never wedge a
/// worker.
pub fn route_outcome(
    pending: PendingRequest,
    outcome: WriteOutcome,
    shutdown: &ShutdownSignal,
) -> Delivery {
    if shutdown.is_raised() {
        return Delivery::ShuttingDown;
    }

    if pending.cancel.is_raised() {
        return Delivery::Cancelled;
    }

    match pending.reply.send(outcome) {
        Ok(()) => Delivery::Delivered,
        Err(_) => Delivery::Abandoned,
    }
}
