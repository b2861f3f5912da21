//! Rate-limited failure reporting
//!
//! Repeated identical failures are collapsed into one warning per
//! report interval; a change of failure class reports immediately.

use std::time::Duration;

use tokio::time::Instant;

/// Decides whether a recurring failure is worth another log line.
#[derive(Debug)]
pub struct ReportGate {
    interval: Duration,
    last_class: Option<&'static str>,
    next_report: Instant,
}

impl ReportGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_class: None,
            next_report: Instant::now(),
        }
    }

    /// True when this failure class should be reported now. Advances the
    /// gate either way.
    pub fn should_report(&mut self, class: &'static str) -> bool {
        let now = Instant::now();
        let changed = self.last_class != Some(class);
        if changed || now >= self.next_report {
            self.last_class = Some(class);
            self.next_report = now + self.interval;
            return true;
        }
        false
    }

    /// Forget the last failure so the next one reports immediately.
    pub fn reset(&mut self) {
        self.last_class = None;
        self.next_report = Instant::now();
    }
}
