//! # Dispatcher
//!
//! Batched event-ingestion core: admission API, batching state machine,
//! worker pool and request/response correlation.
//!
//! Data flow: caller -> [`DispatcherHandle::submit`] -> batcher queue ->
//! (size or idle-timeout threshold) -> idle worker -> sink bulk call ->
//! per-item outcome -> caller's private reply slot.

mod batcher;
mod context;
mod delivery;
mod dispatcher;
mod error;
mod handle;
mod metrics;
mod report;
mod request;
mod worker;

pub use context::{PipelineContext, ShutdownSignal};
pub use delivery::{route_outcome, Delivery};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::SubmitError;
pub use handle::DispatcherHandle;
pub use metrics::{DispatcherMetrics, MetricsSnapshot};
pub use report::ReportGate;
pub use request::{Batch, CancelToken, PendingRequest, ReplyHandle};
