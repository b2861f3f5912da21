//! Pipeline lifecycle context
//!
//! One explicit context object per pipeline instead of ambient globals;
//! lifecycle is init -> run -> signal-shutdown -> drain -> dispose.

use tokio::sync::watch;

/// Owns the one-way, idempotent shutdown broadcast.
pub struct PipelineContext {
    tx: watch::Sender<bool>,
}

impl PipelineContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe a component to the shutdown broadcast.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Raise the shutdown signal. Idempotent; never un-raised.
    pub fn signal_shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Component-side view of the shutdown broadcast.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Non-suspending check.
    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Suspend until shutdown is raised. Also resolves when the context
    /// itself is dropped, so no task outlives its pipeline.
    pub async fn raised(&mut self) {
        let _ = self.rx.wait_for(|raised| *raised).await;
    }
}
