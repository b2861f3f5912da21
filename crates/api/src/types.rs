//! Wire types of the audit HTTP surface
//!
//! Every reply carries the numeric `err_code` / `err_info` pair the
//! existing producers already parse.

use contracts::WriteOutcome;
use serde::Serialize;

/// Stable numeric error codes.
pub mod err_code {
    pub const OK: i32 = 0;
    pub const READ_BODY: i32 = 10000;
    pub const PARSE_BODY: i32 = 10001;
    pub const TIMEOUT: i32 = 10002;
    pub const INDEX: i32 = 10003;
    pub const GENERAL: i32 = 10004;
    pub const BAD_FORMAT: i32 = 10005;
    pub const UNEXPECTED: i32 = 10006;
    pub const SHUTTING_DOWN: i32 = 10007;
}

/// Human-readable text for an error code.
pub fn err_info(code: i32) -> &'static str {
    match code {
        err_code::OK => "success",
        err_code::READ_BODY => "failed to read request body",
        err_code::PARSE_BODY => "failed to parse request body",
        err_code::TIMEOUT => "request timed out",
        err_code::INDEX => "index operation failed",
        err_code::GENERAL => "general error",
        err_code::BAD_FORMAT => "bad request format",
        err_code::UNEXPECTED => "unexpected error",
        err_code::SHUTTING_DOWN => "service is shutting down",
        _ => "unknown error",
    }
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub err_code: i32,
    pub err_info: &'static str,
    pub message: &'static str,
}

impl PingResponse {
    pub fn pong() -> Self {
        Self {
            err_code: err_code::OK,
            err_info: err_info(err_code::OK),
            message: "pong",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub err_code: i32,
    pub err_info: &'static str,
    pub detail: WriteOutcome,
}

impl IndexResponse {
    pub fn ok(detail: WriteOutcome) -> Self {
        Self {
            err_code: err_code::OK,
            err_info: err_info(err_code::OK),
            detail,
        }
    }
}

/// Per-item entry of a bulk reply.
#[derive(Debug, Serialize)]
pub struct BulkItemDetail {
    pub guid: String,
    pub err_code: i32,
    pub err_info: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl BulkItemDetail {
    pub fn from_outcome(outcome: WriteOutcome) -> Self {
        let code = if outcome.is_success() {
            err_code::OK
        } else {
            err_code::INDEX
        };
        Self {
            guid: outcome.guid,
            err_code: code,
            err_info: err_info(code),
            result: Some(outcome.result),
            status: Some(outcome.status),
        }
    }

    pub fn failed(guid: String, code: i32) -> Self {
        Self {
            guid,
            err_code: code,
            err_info: err_info(code),
            result: None,
            status: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub err_code: i32,
    pub err_info: &'static str,
    pub items: Vec<BulkItemDetail>,
}

impl BulkResponse {
    pub fn new(items: Vec<BulkItemDetail>) -> Self {
        let code = if items.iter().all(|item| item.err_code == err_code::OK) {
            err_code::OK
        } else {
            err_code::INDEX
        };
        Self {
            err_code: code,
            err_info: err_info(code),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LevelResponse {
    pub err_code: i32,
    pub err_info: &'static str,
    pub level: String,
}

impl LevelResponse {
    pub fn ok(level: String) -> Self {
        Self {
            err_code: err_code::OK,
            err_info: err_info(err_code::OK),
            level,
        }
    }
}
