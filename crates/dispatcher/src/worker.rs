//! Sink workers
//!
//! Each worker probes the sink until ready, then loops: announce idle,
//! take a batch, execute one bulk call, route every outcome back. A
//! worker handles one batch at a time, so `max_worker` bounds bulk
//! concurrency.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use contracts::{BulkItem, BulkSink};
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::context::ShutdownSignal;
use crate::delivery::{route_outcome, Delivery};
use crate::metrics::DispatcherMetrics;
use crate::report::ReportGate;
use crate::request::{Batch, PendingRequest};

pub(crate) struct Worker<S> {
    pub id: usize,
    pub sink: Arc<S>,
    pub idle_tx: mpsc::Sender<oneshot::Sender<Batch>>,
    pub shutdown: ShutdownSignal,
    pub metrics: Arc<DispatcherMetrics>,
    pub probe_interval: Duration,
    pub report_interval: Duration,
}

impl<S: BulkSink + Sync> Worker<S> {
    pub async fn run(mut self) {
        if !self.wait_sink_ready().await {
            return;
        }

        loop {
            let (slot_tx, slot_rx) = oneshot::channel::<Batch>();

            tokio::select! {
                _ = self.shutdown.raised() => {
                    debug!(worker = self.id, "worker stopping");
                    return;
                }
                sent = self.idle_tx.send(slot_tx) => {
                    if sent.is_err() {
                        debug!(worker = self.id, "batcher gone, worker stopping");
                        return;
                    }
                }
            }

            let batch = tokio::select! {
                _ = self.shutdown.raised() => {
                    debug!(worker = self.id, "worker stopping while idle");
                    return;
                }
                maybe = slot_rx => {
                    match maybe {
                        Ok(batch) => batch,
                        // batcher dropped our slot without filling it
                        Err(_) => continue,
                    }
                }
            };

            if batch.is_empty() {
                continue;
            }
            self.execute(batch).await;
        }
    }

    /// Probe the sink until it answers, shutdown is raised, or the
    /// caller gives up on the whole pipeline. Repeated probe failures
    /// of the same class are reported once per report interval.
    async fn wait_sink_ready(&mut self) -> bool {
        let mut gate = ReportGate::new(self.report_interval);
        loop {
            match self.sink.ready().await {
                Ok(sink_info) => {
                    info!(
                        worker = self.id,
                        sink = self.sink.name(),
                        version = %sink_info.version,
                        "sink ready"
                    );
                    return true;
                }
                Err(e) => {
                    if gate.should_report(e.class()) {
                        warn!(
                            worker = self.id,
                            sink = self.sink.name(),
                            error = %e,
                            "sink not ready, retrying"
                        );
                    }
                }
            }

            tokio::select! {
                _ = self.shutdown.raised() => {
                    debug!(worker = self.id, "worker stopping before sink became ready");
                    return false;
                }
                _ = sleep(self.probe_interval) => {}
            }
        }
    }

    /// One bulk call, then route every outcome to its caller by guid.
    async fn execute(&mut self, batch: Batch) {
        let mut items = Vec::with_capacity(batch.len());
        let mut pending: HashMap<String, PendingRequest> = HashMap::with_capacity(batch.len());
        for request in batch {
            items.push(BulkItem {
                index: request.event.index_name(),
                doc_id: request.event.guid().to_string(),
                body: request.event.body().clone(),
            });
            pending.insert(request.event.guid().to_string(), request);
        }

        let outcomes = match self.sink.bulk_write(items).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                // whole-batch failure: every caller times out on its own
                self.metrics.inc_batch_failures();
                self.metrics.inc_dropped(pending.len() as u64);
                error!(
                    worker = self.id,
                    sink = self.sink.name(),
                    len = pending.len(),
                    error = %e,
                    "bulk write failed, dropping batch"
                );
                return;
            }
        };

        for outcome in outcomes {
            let Some(request) = pending.remove(&outcome.guid) else {
                warn!(
                    worker = self.id,
                    guid = %outcome.guid,
                    "sink reported an outcome for an unknown document"
                );
                continue;
            };
            match route_outcome(request, outcome, &self.shutdown) {
                Delivery::Delivered => self.metrics.inc_delivered(),
                Delivery::Cancelled | Delivery::Abandoned => self.metrics.inc_dropped(1),
                Delivery::ShuttingDown => {
                    self.metrics.inc_dropped(1);
                    debug!(worker = self.id, "outcome dropped during shutdown");
                }
            }
        }

        if !pending.is_empty() {
            self.metrics.inc_dropped(pending.len() as u64);
            warn!(
                worker = self.id,
                missing = pending.len(),
                "sink response omitted outcomes for some documents"
            );
        }
    }
}
