//! BulkSink trait - Worker output interface
//!
//! Defines the abstract interface for the downstream bulk-write engine.

use bytes::Bytes;

use crate::{ContractError, WriteOutcome};

/// One document of a bulk call.
#[derive(Debug, Clone)]
pub struct BulkItem {
    /// Target index bucket
    pub index: String,
    /// Document id (= event guid)
    pub doc_id: String,
    /// Raw JSON document
    pub body: Bytes,
}

/// Result of a readiness probe.
#[derive(Debug, Clone)]
pub struct SinkInfo {
    /// HTTP status of the probe
    pub status: u16,
    /// Server version string
    pub version: String,
}

/// Bulk-write sink trait
///
/// Implementations own the connection lifecycle; callers probe `ready`
/// before the first `bulk_write` and back off while it fails.
#[trait_variant::make(BulkSink: Send)]
pub trait LocalBulkSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Readiness probe
    ///
    /// # Errors
    /// `SinkUnavailable` while the downstream engine cannot be reached.
    async fn ready(&self) -> Result<SinkInfo, ContractError>;

    /// Write one batch, returning one outcome per accepted item
    ///
    /// Item order in the request follows the input order. A whole-call
    /// failure returns `Err`; per-item failures come back as outcomes
    /// with a non-success status.
    async fn bulk_write(&self, items: Vec<BulkItem>) -> Result<Vec<WriteOutcome>, ContractError>;
}
