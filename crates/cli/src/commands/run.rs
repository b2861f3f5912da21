//! `run` command implementation.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use api::AppState;
use dispatcher::{Dispatcher, DispatcherConfig};
use es_sink::ElasticSink;
use observability::{LogController, PipelineMetricsAggregator};
use tracing::{info, warn};

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs, log_controller: LogController) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides, then re-validate
    if let Some(port) = args.port {
        info!(port = port, "Overriding web port from CLI");
        config.web_port = port;
    }
    if let Some(ref addr) = args.es_addr {
        info!(addr = %addr, "Overriding Elasticsearch address from CLI");
        config.es_server_addr = addr.clone();
    }
    config_loader::validate(&config).context("Configuration invalid after CLI overrides")?;

    info!(
        workers = config.max_worker,
        batch_size = config.batch_size,
        batch_timeout_ms = config.batch_timeout_ms,
        queue_capacity = config.queue_capacity,
        web_port = config.web_port,
        es = %config.es_server_addr,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let sink = ElasticSink::new(&config.es_server_addr)
        .with_context(|| format!("Failed to build sink for {}", config.es_server_addr))?;
    let dispatcher = Dispatcher::spawn(DispatcherConfig::from(&config), sink);

    let aggregator = Arc::new(Mutex::new(PipelineMetricsAggregator::new()));
    let state = AppState {
        dispatcher: dispatcher.handle(),
        log_controller,
        req_timeout: Duration::from_millis(config.req_timeout_ms),
        aggregator: Arc::clone(&aggregator),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.web_port));
    let mut server = tokio::spawn(api::serve(addr, state, dispatcher.shutdown_signal()));

    // export the queue depth while the pipeline runs
    let mut sampler_shutdown = dispatcher.shutdown_signal();
    let sampler_handle = dispatcher.handle();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(5));
        loop {
            tokio::select! {
                _ = sampler_shutdown.raised() => break,
                _ = tick.tick() => {
                    observability::record_queue_depth(sampler_handle.metrics().queue_len);
                }
            }
        }
    });

    info!("Pipeline started");

    tokio::select! {
        result = &mut server => {
            // server ending on its own means it failed to bind or crashed
            dispatcher.shutdown().await;
            return match result {
                Ok(Ok(())) => anyhow::bail!("HTTP server stopped unexpectedly"),
                Ok(Err(e)) => Err(e).context("HTTP server failed"),
                Err(e) => Err(e).context("HTTP server task panicked"),
            };
        }
        _ = setup_shutdown_signal() => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    let snapshot = dispatcher.metrics();
    dispatcher.shutdown().await;
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e).context("HTTP server failed during shutdown"),
        Err(e) => return Err(e).context("HTTP server task panicked"),
    }

    info!(
        submitted = snapshot.submitted,
        delivered = snapshot.delivered,
        dropped = snapshot.dropped,
        batches = snapshot.batches,
        batch_failures = snapshot.batch_failures,
        "Pipeline stopped"
    );

    if let Ok(aggregator) = aggregator.lock() {
        println!("{}", aggregator.summary());
    }

    info!("auditpipe finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::PipelineConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Workers: {}", config.max_worker);
    println!("Batch size: {}", config.batch_size);
    println!("Batch timeout: {} ms", config.batch_timeout_ms);
    println!("Request timeout: {} ms", config.req_timeout_ms);
    println!("Queue capacity: {}", config.queue_capacity);
    println!("Web port: {}", config.web_port);
    println!("Elasticsearch: {}", config.es_server_addr);
    println!();
}
