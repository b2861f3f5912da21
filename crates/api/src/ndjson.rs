//! Bulk request body parsing
//!
//! The bulk body is newline-delimited JSON: an action line carrying the
//! event header, then the source document, repeated. Guids must be
//! unique within one request, they double as in-flight correlation keys.

use std::collections::HashSet;

use bytes::Bytes;
use contracts::{AuditEvent, ContractError, EventHeader};
use serde::Deserialize;

#[derive(Deserialize)]
struct ActionLine {
    index: EventHeader,
}

/// Parse a bulk body into events, preserving input order.
pub fn parse_bulk(body: &Bytes) -> Result<Vec<AuditEvent>, ContractError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| ContractError::malformed_event("bulk body is not valid utf-8"))?;

    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(ContractError::malformed_event("empty bulk body"));
    }
    if lines.len() % 2 != 0 {
        return Err(ContractError::malformed_event(
            "bulk body must alternate action and source lines",
        ));
    }

    let mut events = Vec::with_capacity(lines.len() / 2);
    let mut seen = HashSet::with_capacity(lines.len() / 2);
    for pair in lines.chunks_exact(2) {
        let action: ActionLine = serde_json::from_str(pair[0]).map_err(|e| {
            ContractError::malformed_event(format!("invalid action line: {e}"))
        })?;
        let event = AuditEvent::new(action.index, Bytes::copy_from_slice(pair[1].as_bytes()))?;

        if !seen.insert(event.guid().to_string()) {
            return Err(ContractError::malformed_event(format!(
                "duplicate guid '{}' in bulk request",
                event.guid()
            )));
        }
        events.push(event);
    }
    Ok(events)
}
