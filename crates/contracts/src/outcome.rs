//! Per-item result of a bulk sink call

use serde::{Deserialize, Serialize};

/// Outcome of one event's write attempt.
///
/// A non-success status is still a normal reply; interpreting it is the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// Correlation key of the originating event
    pub guid: String,
    /// Sink-provided result string (e.g. "created")
    pub result: String,
    /// Sink-provided HTTP-style status
    pub status: u16,
}

impl WriteOutcome {
    /// Whether the status falls in the success range (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
