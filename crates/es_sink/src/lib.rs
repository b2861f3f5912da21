//! # Elasticsearch bulk sink
//!
//! [`BulkSink`] implementation over the Elasticsearch HTTP API.
//! Readiness is `GET /`; writes go through `POST /_bulk` with one
//! `index` action per document, routed into daily `logstash-*` indices
//! with the event guid as `_id`.

mod response;

use std::time::Duration;

use bytes::Bytes;
use contracts::{BulkItem, BulkSink, ContractError, SinkInfo, WriteOutcome};
use tracing::{debug, instrument};

use crate::response::{BulkResponse, RootInfo};

const SINK_NAME: &str = "elasticsearch";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Elasticsearch-backed bulk sink.
pub struct ElasticSink {
    client: reqwest::Client,
    base_url: String,
}

impl ElasticSink {
    /// Build a sink against `base_url` (e.g. `http://localhost:9200`).
    ///
    /// # Errors
    /// `SinkUnavailable` when the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| ContractError::sink_unavailable(SINK_NAME, e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Build a sink with a caller-provided client (custom timeouts, TLS).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BulkSink for ElasticSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    #[instrument(skip(self), fields(sink = SINK_NAME))]
    async fn ready(&self) -> Result<SinkInfo, ContractError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| ContractError::sink_unavailable(SINK_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::sink_unavailable(
                SINK_NAME,
                format!("probe returned status {status}"),
            ));
        }

        let info: RootInfo = response
            .json()
            .await
            .map_err(|e| ContractError::sink_response(SINK_NAME, e.to_string()))?;

        debug!(version = %info.version.number, "sink probe succeeded");
        Ok(SinkInfo {
            status: status.as_u16(),
            version: info.version.number,
        })
    }

    #[instrument(skip_all, fields(sink = SINK_NAME, len = items.len()))]
    async fn bulk_write(&self, items: Vec<BulkItem>) -> Result<Vec<WriteOutcome>, ContractError> {
        let payload = encode_bulk(&items)?;

        let response = self
            .client
            .post(format!("{}/_bulk", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await
            .map_err(|e| ContractError::sink_call(SINK_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::sink_call(
                SINK_NAME,
                format!("bulk returned status {status}"),
            ));
        }

        let decoded: BulkResponse = response
            .json()
            .await
            .map_err(|e| ContractError::sink_response(SINK_NAME, e.to_string()))?;

        if decoded.items.len() != items.len() {
            return Err(ContractError::sink_response(
                SINK_NAME,
                format!(
                    "bulk reply carried {} items for {} documents",
                    decoded.items.len(),
                    items.len()
                ),
            ));
        }

        Ok(decoded
            .items
            .into_iter()
            .map(|entry| {
                let item = entry.index;
                let result = match (item.result, item.error) {
                    (Some(result), _) => result,
                    (None, Some(error)) => error.reason.unwrap_or(error.kind),
                    (None, None) => "unknown".to_string(),
                };
                WriteOutcome {
                    guid: item.id,
                    result,
                    status: item.status,
                }
            })
            .collect())
    }
}

/// Serialize a batch into the `_bulk` NDJSON wire form.
///
/// Document bodies already on one line pass through untouched; bodies
/// with embedded newlines are recompacted, the bulk protocol forbids
/// multi-line sources.
fn encode_bulk(items: &[BulkItem]) -> Result<Vec<u8>, ContractError> {
    let mut payload = Vec::with_capacity(items.iter().map(|i| i.body.len() + 96).sum());
    for item in items {
        let action = serde_json::json!({
            "index": {
                "_index": item.index,
                "_type": "doc",
                "_id": item.doc_id,
            }
        });
        serde_json::to_writer(&mut payload, &action)
            .map_err(|e| ContractError::sink_call(SINK_NAME, e.to_string()))?;
        payload.push(b'\n');

        let source = compact_source(&item.body)?;
        payload.extend_from_slice(&source);
        payload.push(b'\n');
    }
    Ok(payload)
}

fn compact_source(body: &Bytes) -> Result<Bytes, ContractError> {
    if !body.contains(&b'\n') {
        return Ok(body.clone());
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ContractError::sink_call(SINK_NAME, format!("invalid document: {e}")))?;
    let compact = serde_json::to_vec(&value)
        .map_err(|e| ContractError::sink_call(SINK_NAME, e.to_string()))?;
    Ok(Bytes::from(compact))
}
