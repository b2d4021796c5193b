//! Axum router wiring.
//!
//! Layer order (outermost first): CORS gate, request timeout, body limit.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use crate::{app_state::AppState, ops, receiver, transport};

pub fn build_router(state: AppState) -> Router {
    let server = &state.cfg().server;
    let timeout = Duration::from_millis(server.request_timeout_ms);
    let body_limit = server.max_body_bytes;

    Router::new()
        .route("/", get(ops::redirect).post(ops::redirect))
        .route("/form", post(receiver::form))
        .route("/api", post(receiver::api))
        .route("/json", post(receiver::json))
        .route("/csp", post(receiver::csp))
        .route("/beacon", get(receiver::beacon).post(receiver::beacon))
        .route("/health", get(ops::health))
        .route("/ready", get(ops::ready))
        .route("/metrics", get(ops::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(middleware::from_fn(transport::cors::cors))
        .with_state(state)
}
