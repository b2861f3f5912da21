//! # API
//!
//! HTTP boundary of the audit pipeline: the `/audit` routes, the numeric
//! error-code surface, bulk body parsing, and the server lifecycle.

pub mod error;
pub mod handlers;
pub mod ndjson;
pub mod routes;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::router;
pub use server::serve;
