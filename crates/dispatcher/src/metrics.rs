//! Dispatcher counters
//!
//! Lock-free counters shared by the admission handle, the batcher and
//! the workers. Relaxed ordering is fine, these are monitoring reads.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    submitted: AtomicU64,
    batches: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    batch_failures: AtomicU64,
    queue_len: AtomicUsize,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batches(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dropped(&self, n: u64) {
        self.dropped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_batch_failures(&self) {
        self.batch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Gauge owned by the batcher: events accepted but not yet released
    /// to a worker. Single writer, so reads never see a torn value.
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            batch_failures: self.batch_failures.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub batches: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub batch_failures: u64,
    pub queue_len: usize,
}
