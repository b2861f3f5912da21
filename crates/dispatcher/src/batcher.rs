//! Batching state machine
//!
//! Single consumer of the admission queue. Releases a batch when the
//! queue reaches `batch_size`, or when the oldest queued request has
//! waited `batch_timeout`. A batch is only released to a worker that
//! announced itself idle, so a slow sink applies backpressure all the
//! way to admission.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Sleep};
use tracing::{debug, warn};

use crate::context::ShutdownSignal;
use crate::metrics::DispatcherMetrics;
use crate::request::{Batch, PendingRequest};

use std::sync::Arc;

pub(crate) struct Batcher {
    pub rx: mpsc::Receiver<PendingRequest>,
    pub idle_rx: mpsc::Receiver<oneshot::Sender<Batch>>,
    pub shutdown: ShutdownSignal,
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub metrics: Arc<DispatcherMetrics>,
}

impl Batcher {
    pub async fn run(self) {
        let Batcher {
            mut rx,
            mut idle_rx,
            mut shutdown,
            batch_size,
            batch_timeout,
            metrics,
        } = self;

        let mut queue: VecDeque<PendingRequest> = VecDeque::with_capacity(batch_size);
        // armed when the queue goes non-empty, disarmed on every release
        let mut idle_timer: Option<Pin<Box<Sleep>>> = None;
        let mut batch_due = false;

        loop {
            tokio::select! {
                _ = shutdown.raised() => {
                    debug!(pending = queue.len(), "batcher stopping");
                    return;
                }
                maybe = rx.recv() => {
                    match maybe {
                        Some(pending) => queue.push_back(pending),
                        None => {
                            debug!("admission channel closed, batcher stopping");
                            return;
                        }
                    }
                }
                _ = async { idle_timer.as_mut().expect("guarded by is_some").await }, if idle_timer.is_some() => {
                    batch_due = true;
                    idle_timer = None;
                }
            }

            while queue.len() >= batch_size || batch_due {
                if queue.is_empty() {
                    batch_due = false;
                    break;
                }
                batch_due = false;
                idle_timer = None;

                let take = queue.len().min(batch_size);
                let batch: Batch = queue.drain(..take).collect();
                metrics.set_queue_len(queue.len());

                tokio::select! {
                    _ = shutdown.raised() => {
                        debug!(dropped = batch.len(), "batcher stopping mid-release");
                        return;
                    }
                    maybe_slot = idle_rx.recv() => {
                        match maybe_slot {
                            Some(slot) => {
                                let len = batch.len();
                                if slot.send(batch).is_err() {
                                    warn!(len, "idle worker vanished before taking its batch");
                                } else {
                                    metrics.inc_batches();
                                    debug!(len, "batch released");
                                }
                            }
                            None => {
                                debug!("all workers gone, batcher stopping");
                                return;
                            }
                        }
                    }
                }
            }

            if !queue.is_empty() && idle_timer.is_none() {
                idle_timer = Some(Box::pin(sleep(batch_timeout)));
            }
            metrics.set_queue_len(queue.len());
        }
    }
}
