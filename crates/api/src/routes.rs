//! Route table

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Build the `/audit` router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/audit/ping", get(handlers::ping))
        .route("/audit/_index", post(handlers::index_event))
        .route("/audit/_bulk", post(handlers::bulk_events))
        .route(
            "/audit/level",
            get(handlers::get_level).post(handlers::set_level),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
