//! Admission handle
//!
//! Cloneable front door of the pipeline. `submit` is the synchronous
//! contract: one event in, one outcome (or timeout) out, with the whole
//! wait bounded by a single deadline covering admission and reply.

use std::time::Duration;

use contracts::{AuditEvent, WriteOutcome};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::debug;

use std::sync::Arc;

use crate::context::ShutdownSignal;
use crate::error::SubmitError;
use crate::metrics::DispatcherMetrics;
use crate::request::{PendingRequest, ReplyHandle};

#[derive(Clone)]
pub struct DispatcherHandle {
    pub(crate) tx: mpsc::Sender<PendingRequest>,
    pub(crate) shutdown: ShutdownSignal,
    pub(crate) metrics: Arc<DispatcherMetrics>,
}

impl DispatcherHandle {
    /// Point-in-time counters of the pipeline this handle feeds.
    pub fn metrics(&self) -> crate::metrics::MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Admit one event without waiting for its outcome. Blocks while the
    /// admission queue is full.
    pub async fn enqueue(&self, event: AuditEvent) -> Result<ReplyHandle, SubmitError> {
        if self.shutdown.is_raised() {
            return Err(SubmitError::ShuttingDown);
        }

        let (pending, reply) = PendingRequest::new(event);
        if self.tx.send(pending).await.is_err() {
            return Err(SubmitError::ShuttingDown);
        }
        // counted only once the event actually entered the queue
        self.metrics.inc_submitted();
        Ok(reply)
    }

    /// Admit one event and wait for its outcome, bounded by `deadline`.
    ///
    /// The deadline covers both phases. If admission itself stalls past
    /// it (queue full under backpressure) the call times out without
    /// ever entering the queue. If the reply slot is abandoned the call
    /// still waits out the deadline so the caller observes a uniform
    /// timeout, never a distinct "lost" error.
    pub async fn submit(
        &self,
        event: AuditEvent,
        deadline: Duration,
    ) -> Result<WriteOutcome, SubmitError> {
        let mut timer = std::pin::pin!(sleep(deadline));

        let reply = tokio::select! {
            admitted = self.enqueue(event) => admitted?,
            _ = timer.as_mut() => {
                debug!("admission stalled past the caller deadline");
                return Err(SubmitError::Timeout);
            }
        };

        let cancel = reply.cancel_token();
        let maybe = tokio::select! {
            maybe = reply.outcome() => maybe,
            _ = timer.as_mut() => {
                cancel.raise();
                return Err(SubmitError::Timeout);
            }
        };

        match maybe {
            Some(outcome) => Ok(outcome),
            None => {
                // slot abandoned, run out the rest of the deadline so the
                // caller observes a uniform timeout
                timer.await;
                Err(SubmitError::Timeout)
            }
        }
    }
}
