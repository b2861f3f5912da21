//! Configuration validation
//!
//! Rules:
//! - max_worker >= 1
//! - batch_size > 100
//! - batch_timeout_ms > 50
//! - req_timeout_ms > 100
//! - queue_capacity >= 1
//! - web_port > 0
//! - es_server_addr is an http(s) URL
//!
//! Out-of-range values are fatal at startup; the pipeline never starts in
//! an invalid state.

use contracts::{ContractError, PipelineConfig};
use validator::Validate;

/// Validate a PipelineConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PipelineConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_sink_addr(config)?;
    Ok(())
}

/// Range checks declared on the config struct itself
fn validate_ranges(config: &PipelineConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "out of range".to_string());
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

/// Sink address must be a plausible http(s) base URL
fn validate_sink_addr(config: &PipelineConfig) -> Result<(), ContractError> {
    let addr = config.es_server_addr.trim();

    if addr.is_empty() {
        return Err(ContractError::config_validation(
            "es_server_addr",
            "sink server address cannot be empty",
        ));
    }

    if !addr.starts_with("http://") && !addr.starts_with("https://") {
        return Err(ContractError::config_validation(
            "es_server_addr",
            format!("expected an http(s) URL, got '{addr}'"),
        ));
    }

    Ok(())
}
