//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness, always 200
//! - `/ready`   : readiness (503 when draining)
//! - `/metrics` : Prometheus text format
//! - `/`        : redirect to the configured informational page

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

use crate::app_state::AppState;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let extra = state.metrics_extra();
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.cfg().server.redirect_url)
}
