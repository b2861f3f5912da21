//! Audit event - admission input and storage document

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ContractError;

/// Header fields every event must carry.
///
/// The wire tag is `timstamp` (sic), kept for compatibility with existing
/// producers; `timestamp` is accepted as an alias.
#[derive(Debug, Clone, Deserialize)]
pub struct EventHeader {
    #[serde(rename = "timstamp", alias = "timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guid: String,
}

/// A caller-supplied audit record.
///
/// The guid doubles as the storage document id and the reply correlation
/// key, so it must be unique among concurrently in-flight events.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    guid: String,
    timestamp: DateTime<Utc>,
    body: Bytes,
}

impl AuditEvent {
    /// Build an event from already-extracted header fields.
    ///
    /// # Errors
    /// `MalformedEvent` when the guid is empty or the timestamp is absent.
    pub fn new(header: EventHeader, body: Bytes) -> Result<Self, ContractError> {
        let timestamp = header
            .timestamp
            .ok_or_else(|| ContractError::malformed_event("missing timestamp"))?;

        if header.guid.is_empty() {
            return Err(ContractError::malformed_event("missing guid"));
        }

        Ok(Self {
            guid: header.guid,
            timestamp,
            body,
        })
    }

    /// Parse a single-event JSON body; the raw body becomes the document.
    pub fn from_json(body: Bytes) -> Result<Self, ContractError> {
        let header: EventHeader = serde_json::from_slice(&body)
            .map_err(|e| ContractError::malformed_event(format!("invalid event body: {e}")))?;
        Self::new(header, body)
    }

    /// Correlation key / document id
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Event time (UTC)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Opaque JSON document
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Daily index bucket, `logstash-YYYY.MM.DD` in UTC.
    pub fn index_name(&self) -> String {
        format!("logstash-{}", self.timestamp.format("%Y.%m.%d"))
    }
}
