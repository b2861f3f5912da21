//! # Observability
//!
//! Tracing initialization and Prometheus metrics for the pipeline.
//!
//! - Tracing with JSON/Pretty/Compact formats, `RUST_LOG` respected
//! - Runtime log level changes through [`LogController`]
//! - Prometheus exporter on a configurable port
//!
//! ```ignore
//! let controller = observability::init()?;
//! controller.set_level("debug")?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::{Arc, RwLock};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

pub use crate::metrics::{
    record_event_admitted, record_event_outcome, record_queue_depth, record_submit_latency_ms,
    MetricsSummary, PipelineMetricsAggregator, RunningStats, StatsSummary,
};

/// Initialize observability with defaults (JSON logs, metrics on 9000).
pub fn init() -> Result<LogController> {
    init_with_config(ObservabilityConfig::default())
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log output format
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Default log level when RUST_LOG is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: Some(9000),
            default_log_level: "info".to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines
    #[default]
    Json,
    /// Human-readable multi-line
    Pretty,
    /// Single-line compact
    Compact,
}

/// Runtime control over the active log level.
///
/// Wraps the subscriber's reload handle; cheap to clone and share with
/// the HTTP level endpoint.
#[derive(Clone)]
pub struct LogController {
    handle: reload::Handle<EnvFilter, Registry>,
    current: Arc<RwLock<String>>,
}

impl LogController {
    /// Build a controller around an existing reload handle.
    pub fn new(handle: reload::Handle<EnvFilter, Registry>, initial: impl Into<String>) -> Self {
        Self {
            handle,
            current: Arc::new(RwLock::new(initial.into())),
        }
    }

    /// Replace the active filter with `directive` (a level like "debug"
    /// or a full EnvFilter expression).
    pub fn set_level(&self, directive: &str) -> Result<()> {
        let filter = EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level directive '{directive}'"))?;
        self.handle
            .reload(filter)
            .context("failed to reload log filter")?;
        if let Ok(mut current) = self.current.write() {
            *current = directive.to_string();
        }
        tracing::info!(level = directive, "log level changed");
        Ok(())
    }

    /// The directive currently in effect.
    pub fn level(&self) -> String {
        self.current
            .read()
            .map(|level| level.clone())
            .unwrap_or_default()
    }
}

/// Initialize tracing and the Prometheus exporter.
pub fn init_with_config(config: ObservabilityConfig) -> Result<LogController> {
    let initial = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| config.default_log_level.clone());
    let filter = EnvFilter::try_new(&initial)
        .with_context(|| format!("invalid log level directive '{initial}'"))?;
    let (filter, handle) = reload::Layer::new(filter);

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            registry
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            registry
                .with(fmt::layer().pretty())
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            registry
                .with(fmt::layer().compact())
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    if let Some(port) = config.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("Failed to install Prometheus recorder")?;
        tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(LogController::new(handle, initial))
}

/// Install only the Prometheus exporter, for processes that set up
/// tracing themselves.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;
    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
