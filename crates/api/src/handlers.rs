//! Request handlers for the audit surface

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use dispatcher::DispatcherHandle;
use observability::{metrics, LogController, PipelineMetricsAggregator};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::ndjson::parse_bulk;
use crate::types::{
    err_code, BulkItemDetail, BulkResponse, IndexResponse, LevelResponse, PingResponse,
};

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: DispatcherHandle,
    pub log_controller: LogController,
    pub req_timeout: Duration,
    pub aggregator: Arc<Mutex<PipelineMetricsAggregator>>,
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::pong())
}

/// `POST /audit/_index` - one event, one outcome.
pub async fn index_event(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<IndexResponse>, ApiError> {
    let body = body.map_err(|e| ApiError::read_body(e.to_string()))?;
    let event = contracts::AuditEvent::from_json(body)
        .map_err(|e| ApiError::parse_body(e.to_string()))?;

    let started = Instant::now();
    let result = state.dispatcher.submit(event, state.req_timeout).await;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::record_submit_latency_ms(latency_ms);

    let outcome = match result {
        Ok(outcome) => {
            metrics::record_event_admitted();
            outcome
        }
        Err(e) => {
            record_request(&state, false, latency_ms);
            return Err(e.into());
        }
    };

    let success = outcome.is_success();
    metrics::record_event_outcome(success);
    record_request(&state, success, latency_ms);

    if success {
        debug!(guid = %outcome.guid, status = outcome.status, "event indexed");
        Ok(Json(IndexResponse::ok(outcome)))
    } else {
        warn!(guid = %outcome.guid, status = outcome.status, "event rejected by sink");
        Err(ApiError::index_failure(outcome))
    }
}

/// `POST /audit/_bulk` - many events under one shared deadline.
pub async fn bulk_events(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<BulkResponse>, ApiError> {
    let body = body.map_err(|e| ApiError::read_body(e.to_string()))?;
    let events = parse_bulk(&body).map_err(|e| ApiError::bad_format(e.to_string()))?;

    let deadline = tokio::time::Instant::now() + state.req_timeout;
    let started = Instant::now();

    // admit everything first so the whole request shares one batch window;
    // each admission send is itself bounded by the shared deadline
    let mut replies = Vec::with_capacity(events.len());
    let mut unadmitted = Vec::new();
    let mut queue = events.into_iter();
    while let Some(event) = queue.next() {
        let guid = event.guid().to_string();
        match tokio::time::timeout_at(deadline, state.dispatcher.enqueue(event)).await {
            Ok(Ok(reply)) => {
                metrics::record_event_admitted();
                replies.push((guid, reply));
            }
            Ok(Err(e)) => return Err(ApiError::from(e)),
            Err(_) => {
                // admission stalled past the deadline; the rest of the
                // request cannot be admitted under it either
                unadmitted.push(guid);
                unadmitted.extend(queue.by_ref().map(|event| event.guid().to_string()));
                break;
            }
        }
    }

    let mut items = Vec::with_capacity(replies.len());
    for (guid, reply) in replies {
        let cancel = reply.cancel_token();
        let detail = match tokio::time::timeout_at(deadline, reply.outcome()).await {
            Ok(Some(outcome)) => {
                metrics::record_event_outcome(outcome.is_success());
                BulkItemDetail::from_outcome(outcome)
            }
            Ok(None) => {
                metrics::record_event_outcome(false);
                BulkItemDetail::failed(guid, err_code::UNEXPECTED)
            }
            Err(_) => {
                cancel.raise();
                metrics::record_event_outcome(false);
                BulkItemDetail::failed(guid, err_code::TIMEOUT)
            }
        };
        items.push(detail);
    }

    for guid in unadmitted {
        items.push(BulkItemDetail::failed(guid, err_code::TIMEOUT));
    }

    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::record_submit_latency_ms(latency_ms);
    let all_ok = items.iter().all(|item| item.err_code == err_code::OK);
    record_request(&state, all_ok, latency_ms);

    Ok(Json(BulkResponse::new(items)))
}

pub async fn get_level(State(state): State<AppState>) -> Json<LevelResponse> {
    Json(LevelResponse::ok(state.log_controller.level()))
}

#[derive(Debug, Deserialize)]
pub struct SetLevelRequest {
    pub level: String,
}

pub async fn set_level(
    State(state): State<AppState>,
    body: Result<Json<SetLevelRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<LevelResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::parse_body(e.to_string()))?;
    state
        .log_controller
        .set_level(&request.level)
        .map_err(|e| ApiError::bad_format(e.to_string()))?;
    Ok(Json(LevelResponse::ok(state.log_controller.level())))
}

fn record_request(state: &AppState, success: bool, latency_ms: f64) {
    if let Ok(mut aggregator) = state.aggregator.lock() {
        aggregator.update_request(success, latency_ms);
    }
}
