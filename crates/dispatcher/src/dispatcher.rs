//! Pipeline assembly
//!
//! Owns the lifecycle: spawn the batcher and the worker pool, hand out
//! admission handles, and on shutdown drain every task before
//! returning.

use std::sync::Arc;
use std::time::Duration;

use contracts::{BulkSink, PipelineConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::batcher::Batcher;
use crate::context::{PipelineContext, ShutdownSignal};
use crate::handle::DispatcherHandle;
use crate::metrics::{DispatcherMetrics, MetricsSnapshot};
use crate::request::Batch;
use crate::worker::Worker;

/// Tuning knobs of one pipeline instance.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub max_worker: usize,
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub queue_capacity: usize,
    pub probe_interval: Duration,
    pub report_interval: Duration,
}

impl DispatcherConfig {
    pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);
}

impl From<&PipelineConfig> for DispatcherConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_worker: config.max_worker,
            batch_size: config.batch_size,
            batch_timeout: Duration::from_millis(config.batch_timeout_ms),
            queue_capacity: config.queue_capacity,
            probe_interval: Self::DEFAULT_PROBE_INTERVAL,
            report_interval: Self::DEFAULT_REPORT_INTERVAL,
        }
    }
}

/// A running pipeline: batcher task plus `max_worker` worker tasks.
pub struct Dispatcher {
    handle: DispatcherHandle,
    ctx: PipelineContext,
    tasks: Vec<JoinHandle<()>>,
    metrics: Arc<DispatcherMetrics>,
}

impl Dispatcher {
    pub fn spawn<S>(config: DispatcherConfig, sink: S) -> Self
    where
        S: BulkSink + Send + Sync + 'static,
    {
        let ctx = PipelineContext::new();
        let metrics = Arc::new(DispatcherMetrics::new());
        let sink = Arc::new(sink);

        let (tx, rx) = mpsc::channel(config.queue_capacity);
        // idle announcements, one in-flight slot per worker at most
        let (idle_tx, idle_rx) = mpsc::channel::<oneshot::Sender<Batch>>(config.max_worker);

        let mut tasks = Vec::with_capacity(config.max_worker + 1);
        tasks.push(tokio::spawn(
            Batcher {
                rx,
                idle_rx,
                shutdown: ctx.subscribe(),
                batch_size: config.batch_size,
                batch_timeout: config.batch_timeout,
                metrics: Arc::clone(&metrics),
            }
            .run(),
        ));

        for id in 0..config.max_worker {
            tasks.push(tokio::spawn(
                Worker {
                    id,
                    sink: Arc::clone(&sink),
                    idle_tx: idle_tx.clone(),
                    shutdown: ctx.subscribe(),
                    metrics: Arc::clone(&metrics),
                    probe_interval: config.probe_interval,
                    report_interval: config.report_interval,
                }
                .run(),
            ));
        }
        drop(idle_tx);

        info!(
            workers = config.max_worker,
            batch_size = config.batch_size,
            queue_capacity = config.queue_capacity,
            "dispatcher started"
        );

        let handle = DispatcherHandle {
            tx,
            shutdown: ctx.subscribe(),
            metrics: Arc::clone(&metrics),
        };
        Self {
            handle,
            ctx,
            tasks,
            metrics,
        }
    }

    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.ctx.subscribe()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Raise shutdown and wait for the batcher and every worker to stop.
    pub async fn shutdown(self) {
        self.ctx.signal_shutdown();
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "pipeline task panicked during shutdown");
            }
        }
        info!("dispatcher stopped");
    }
}
