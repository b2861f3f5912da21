//! HTTP error replies
//!
//! One error type for every handler; the numeric code and the HTTP
//! status travel together so the mapping lives in one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::WriteOutcome;
use dispatcher::SubmitError;
use serde::Serialize;

use crate::types::{err_code, err_info};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub message: String,
    /// Outcome attached to index failures so callers see what the sink said
    pub detail: Option<WriteOutcome>,
}

impl ApiError {
    fn new(status: StatusCode, code: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn read_body(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err_code::READ_BODY, message)
    }

    pub fn parse_body(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err_code::PARSE_BODY, message)
    }

    pub fn bad_format(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err_code::BAD_FORMAT, message)
    }

    pub fn timeout() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            err_code::TIMEOUT,
            "no outcome before the deadline",
        )
    }

    pub fn shutting_down() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            err_code::SHUTTING_DOWN,
            "service is shutting down",
        )
    }

    pub fn index_failure(outcome: WriteOutcome) -> Self {
        let mut error = Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            err_code::INDEX,
            format!("index returned status {}", outcome.status),
        );
        error.detail = Some(outcome);
        error
    }
}

impl From<SubmitError> for ApiError {
    fn from(error: SubmitError) -> Self {
        match error {
            SubmitError::Timeout => Self::timeout(),
            SubmitError::ShuttingDown => Self::shutting_down(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    err_code: i32,
    err_info: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<WriteOutcome>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            err_code: self.code,
            err_info: err_info(self.code),
            message: self.message,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_error_mapping() {
        let timeout = ApiError::from(SubmitError::Timeout);
        assert_eq!(timeout.code, err_code::TIMEOUT);
        assert_eq!(timeout.status, StatusCode::INTERNAL_SERVER_ERROR);

        let down = ApiError::from(SubmitError::ShuttingDown);
        assert_eq!(down.code, err_code::SHUTTING_DOWN);
        assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_index_failure_keeps_outcome() {
        let error = ApiError::index_failure(WriteOutcome {
            guid: "g".into(),
            result: "rejected".into(),
            status: 429,
        });
        assert_eq!(error.code, err_code::INDEX);
        assert_eq!(error.detail.as_ref().unwrap().status, 429);
    }
}
