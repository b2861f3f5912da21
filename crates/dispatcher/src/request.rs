//! Request/response correlation types
//!
//! Each admitted event carries its own single-use reply slot and a
//! cancellation token. Both are shared between exactly one caller and
//! one worker for the life of the request, never reused.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{AuditEvent, WriteOutcome};
use tokio::sync::oneshot;

/// Cancellation token the caller raises when it stops waiting, so a
/// worker drops the outcome instead of wasting a delivery attempt.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// An admitted event together with its reply slot and cancel token.
#[derive(Debug)]
pub struct PendingRequest {
    pub event: AuditEvent,
    pub(crate) reply: oneshot::Sender<WriteOutcome>,
    pub(crate) cancel: CancelToken,
}

impl PendingRequest {
    /// Create a request plus the caller-side handle for its reply slot.
    pub fn new(event: AuditEvent) -> (Self, ReplyHandle) {
        let (reply, rx) = oneshot::channel();
        let cancel = CancelToken::new();
        (
            Self {
                event,
                reply,
                cancel: cancel.clone(),
            },
            ReplyHandle { rx, cancel },
        )
    }
}

/// Caller-side end of a pending request.
#[derive(Debug)]
pub struct ReplyHandle {
    rx: oneshot::Receiver<WriteOutcome>,
    cancel: CancelToken,
}

impl ReplyHandle {
    /// Token to raise when the caller abandons this request.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the outcome. `None` means the reply slot was dropped
    /// without a reply (the batch was abandoned).
    pub async fn outcome(self) -> Option<WriteOutcome> {
        self.rx.await.ok()
    }
}

/// An ordered, bounded group of pending requests, consumed exactly once
/// by one worker.
pub type Batch = Vec<PendingRequest>;
