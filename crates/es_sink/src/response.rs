//! Wire types for the Elasticsearch HTTP replies we decode.

use serde::Deserialize;

/// Reply of `GET /`.
#[derive(Debug, Deserialize)]
pub struct RootInfo {
    pub version: VersionInfo,
}

#[derive(Debug, Deserialize)]
pub struct VersionInfo {
    pub number: String,
}

/// Reply of `POST /_bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub errors: bool,
    pub items: Vec<BulkItemEntry>,
}

/// One entry of the `items` array; the operation name is the key.
#[derive(Debug, Deserialize)]
pub struct BulkItemEntry {
    pub index: BulkItemStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkItemStatus {
    #[serde(rename = "_id")]
    pub id: String,
    /// "created"/"updated" on success, absent on failure
    pub result: Option<String>,
    pub status: u16,
    pub error: Option<BulkItemError>,
}

#[derive(Debug, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: Option<String>,
}
