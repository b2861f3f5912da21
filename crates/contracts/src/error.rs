//! Layered error definitions
//!
//! Categorized by source: config / event / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Event Errors =====
    /// Event rejected before admission
    #[error("malformed event: {message}")]
    MalformedEvent { message: String },

    // ===== Sink Errors =====
    /// Sink readiness probe failed
    #[error("sink '{sink_name}' unavailable: {message}")]
    SinkUnavailable { sink_name: String, message: String },

    /// Whole bulk call failed
    #[error("sink '{sink_name}' bulk call failed: {message}")]
    SinkCall { sink_name: String, message: String },

    /// Sink reply could not be decoded
    #[error("sink '{sink_name}' response error: {message}")]
    SinkResponse { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create malformed event error
    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    /// Create sink unavailable error
    pub fn sink_unavailable(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkUnavailable {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink call error
    pub fn sink_call(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCall {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink response error
    pub fn sink_response(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkResponse {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Stable per-variant tag, used to suppress duplicate log reports.
    pub fn class(&self) -> &'static str {
        match self {
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::MalformedEvent { .. } => "malformed_event",
            Self::SinkUnavailable { .. } => "sink_unavailable",
            Self::SinkCall { .. } => "sink_call",
            Self::SinkResponse { .. } => "sink_response",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}
