//! Mock bulk sink for pipeline tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use contracts::{AuditEvent, BulkItem, BulkSink, ContractError, EventHeader, SinkInfo, WriteOutcome};
use tokio::sync::Notify;

#[derive(Default)]
struct MockInner {
    fail_ready: bool,
    fail_bulk: bool,
    duplicate_outcomes: bool,
    gate: Option<Arc<Notify>>,
    ready_calls: AtomicU64,
    batches: Mutex<Vec<Vec<String>>>,
}

/// Recording sink with switchable failure modes.
#[derive(Clone, Default)]
pub struct MockBulkSink {
    inner: Arc<MockInner>,
}

impl MockBulkSink {
    /// Sink that accepts everything with status 201.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose readiness probe never succeeds.
    pub fn unready() -> Self {
        Self {
            inner: Arc::new(MockInner {
                fail_ready: true,
                ..Default::default()
            }),
        }
    }

    /// Sink whose bulk calls fail as a whole.
    pub fn failing() -> Self {
        Self {
            inner: Arc::new(MockInner {
                fail_bulk: true,
                ..Default::default()
            }),
        }
    }

    /// Sink that reports every outcome twice.
    pub fn duplicating() -> Self {
        Self {
            inner: Arc::new(MockInner {
                duplicate_outcomes: true,
                ..Default::default()
            }),
        }
    }

    /// Sink that records each batch, then blocks until the returned gate
    /// is notified once per bulk call.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                inner: Arc::new(MockInner {
                    gate: Some(Arc::clone(&gate)),
                    ..Default::default()
                }),
            },
            gate,
        )
    }

    /// Guids of every batch received so far, in arrival order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.inner.batches.lock().unwrap().clone()
    }

    pub fn ready_calls(&self) -> u64 {
        self.inner.ready_calls.load(Ordering::Relaxed)
    }
}

impl BulkSink for MockBulkSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ready(&self) -> Result<SinkInfo, ContractError> {
        self.inner.ready_calls.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_ready {
            return Err(ContractError::sink_unavailable("mock", "connection refused"));
        }
        Ok(SinkInfo {
            status: 200,
            version: "0.0.0".into(),
        })
    }

    async fn bulk_write(&self, items: Vec<BulkItem>) -> Result<Vec<WriteOutcome>, ContractError> {
        self.inner
            .batches
            .lock()
            .unwrap()
            .push(items.iter().map(|item| item.doc_id.clone()).collect());

        if let Some(ref gate) = self.inner.gate {
            gate.notified().await;
        }
        if self.inner.fail_bulk {
            return Err(ContractError::sink_call("mock", "forced failure"));
        }

        let mut outcomes = Vec::new();
        for item in items {
            let outcome = WriteOutcome {
                guid: item.doc_id,
                result: "created".into(),
                status: 201,
            };
            if self.inner.duplicate_outcomes {
                outcomes.push(outcome.clone());
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Event with a fixed timestamp and the given guid.
pub fn event(guid: &str) -> AuditEvent {
    AuditEvent::new(
        EventHeader {
            timestamp: Some("2023-04-01T12:00:00Z".parse().expect("valid timestamp")),
            guid: guid.to_string(),
        },
        Bytes::from(format!(r#"{{"guid":"{guid}","op":"login"}}"#)),
    )
    .expect("valid event")
}
