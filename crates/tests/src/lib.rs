//! # Integration Tests
//!
//! End-to-end coverage of the pipeline:
//! - batching and delivery properties against a mock sink
//! - HTTP round trips through the real router and sink wiring

pub mod mock;

#[cfg(test)]
mod pipeline_properties;

#[cfg(test)]
mod http_round_trip;
