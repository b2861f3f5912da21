//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    max_worker: usize,
    batch_size: usize,
    batch_timeout_ms: u64,
    req_timeout_ms: u64,
    queue_capacity: usize,
    web_port: u16,
    es_server_addr: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    max_worker: config.max_worker,
                    batch_size: config.batch_size,
                    batch_timeout_ms: config.batch_timeout_ms,
                    req_timeout_ms: config.req_timeout_ms,
                    queue_capacity: config.queue_capacity,
                    web_port: config.web_port,
                    es_server_addr: config.es_server_addr.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::PipelineConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.queue_capacity < config.batch_size {
        warnings.push(format!(
            "queue_capacity ({}) is smaller than batch_size ({}) - full batches can only form via the idle timeout",
            config.queue_capacity, config.batch_size
        ));
    }

    if config.req_timeout_ms < config.batch_timeout_ms * 2 {
        warnings.push(format!(
            "req_timeout_ms ({}) leaves little headroom over batch_timeout_ms ({}) - requests may time out while batching",
            config.req_timeout_ms, config.batch_timeout_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Workers: {}", summary.max_worker);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Batch timeout: {} ms", summary.batch_timeout_ms);
            println!("  Request timeout: {} ms", summary.req_timeout_ms);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Web port: {}", summary.web_port);
            println!("  Elasticsearch: {}", summary.es_server_addr);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
