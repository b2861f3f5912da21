//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Correlation Model
//! - `guid` is both the storage document id and the reply correlation key
//! - `timestamp` (UTC) selects the daily index bucket

mod error;
mod event;
mod outcome;
mod pipeline_config;
mod sink;

pub use error::*;
pub use event::{AuditEvent, EventHeader};
pub use outcome::WriteOutcome;
pub use pipeline_config::PipelineConfig;
pub use sink::{BulkItem, BulkSink, LocalBulkSink, SinkInfo};
