//! Dispatcher error types

use thiserror::Error;

/// Errors surfaced to admission callers
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// No reply arrived within the caller's deadline
    #[error("request timed out before a reply arrived")]
    Timeout,

    /// Admission refused, the pipeline is shutting down
    #[error("dispatcher is shutting down")]
    ShuttingDown,
}
