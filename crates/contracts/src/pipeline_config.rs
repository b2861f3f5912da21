//! Pipeline configuration surface
//!
//! Out-of-range values are rejected at startup, never clamped.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration consumed by the dispatcher, workers and front-end.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Number of concurrent workers
    #[serde(default = "default_max_worker")]
    #[validate(range(min = 1, message = "max_worker must be at least 1"))]
    pub max_worker: usize,

    /// Maximum requests per batch
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 101, message = "batch_size must be larger than 100"))]
    pub batch_size: usize,

    /// Idle time before a partial batch is released, milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    #[validate(range(min = 51, message = "batch_timeout_ms must be larger than 50"))]
    pub batch_timeout_ms: u64,

    /// Per-request deadline at the front-end boundary, milliseconds
    #[serde(default = "default_req_timeout_ms")]
    #[validate(range(min = 101, message = "req_timeout_ms must be larger than 100"))]
    pub req_timeout_ms: u64,

    /// Admission queue capacity (bounded-block under overflow)
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be at least 1"))]
    pub queue_capacity: usize,

    /// HTTP listen port
    #[serde(default = "default_web_port")]
    #[validate(range(min = 1, message = "web_port must be larger than 0"))]
    pub web_port: u16,

    /// Bulk sink base address, e.g. "http://localhost:9200"
    #[serde(default = "default_es_server_addr")]
    pub es_server_addr: String,
}

fn default_max_worker() -> usize {
    8
}

fn default_batch_size() -> usize {
    1000
}

fn default_batch_timeout_ms() -> u64 {
    300
}

fn default_req_timeout_ms() -> u64 {
    3000
}

fn default_queue_capacity() -> usize {
    2000
}

fn default_web_port() -> u16 {
    8080
}

fn default_es_server_addr() -> String {
    "http://localhost:9200".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_worker: default_max_worker(),
            batch_size: default_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
            req_timeout_ms: default_req_timeout_ms(),
            queue_capacity: default_queue_capacity(),
            web_port: default_web_port(),
            es_server_addr: default_es_server_addr(),
        }
    }
}
