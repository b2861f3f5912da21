//! Pipeline metrics
//!
//! Prometheus recording helpers plus an in-memory aggregator for the
//! end-of-run summary.

use metrics::{counter, gauge, histogram};

/// Record one admitted event.
pub fn record_event_admitted() {
    counter!("auditpipe_events_admitted_total").increment(1);
}

/// Record one completed event (delivered or failed).
pub fn record_event_outcome(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("auditpipe_events_completed_total", "status" => status).increment(1);
}

/// Record the end-to-end latency of one submit call.
pub fn record_submit_latency_ms(latency_ms: f64) {
    histogram!("auditpipe_submit_latency_ms").record(latency_ms);
}

/// Record the admission queue depth.
pub fn record_queue_depth(depth: usize) {
    gauge!("auditpipe_queue_depth").set(depth as f64);
}

/// In-memory aggregation for the shutdown summary.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetricsAggregator {
    /// Admitted events
    pub total_events: u64,
    /// Events that produced a successful outcome
    pub total_delivered: u64,
    /// Events that timed out or failed
    pub total_failed: u64,
    /// Submit latency statistics (ms)
    pub latency_stats: RunningStats,
}

impl PipelineMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one completed request with its observed latency.
    pub fn update_request(&mut self, success: bool, latency_ms: f64) {
        self.total_events += 1;
        if success {
            self.total_delivered += 1;
        } else {
            self.total_failed += 1;
        }
        self.latency_stats.push(latency_ms);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_events: self.total_events,
            total_delivered: self.total_delivered,
            total_failed: self.total_failed,
            failure_rate: if self.total_events > 0 {
                self.total_failed as f64 / self.total_events as f64 * 100.0
            } else {
                0.0
            },
            submit_latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Shutdown summary report.
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_events: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
    pub failure_rate: f64,
    pub submit_latency_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pipeline Metrics Summary ===")?;
        writeln!(f, "Events: {}", self.total_events)?;
        writeln!(f, "Delivered: {}", self.total_delivered)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.total_failed, self.failure_rate
        )?;
        writeln!(f, "Submit latency (ms): {}", self.submit_latency_ms)?;
        Ok(())
    }
}

/// Summary of one running statistic.
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
