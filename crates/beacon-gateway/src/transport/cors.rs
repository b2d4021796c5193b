//! CORS gate applied in front of every route.
//!
//! `OPTIONS` is answered here with 204 and never reaches a handler. `GET` and
//! `POST` pass through and get the same headers on the way out. Any other
//! method is refused with 405 before routing.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use beacon_core::BeaconError;

use super::response::ApiError;

pub const ALLOW_METHODS: &str = "GET, POST";
pub const MAX_AGE_SECS: &str = "86400";

fn apply_headers(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}

pub async fn cors(req: Request, next: Next) -> Response {
    match req.method() {
        &Method::OPTIONS => {
            let mut res = StatusCode::NO_CONTENT.into_response();
            apply_headers(res.headers_mut());
            res
        }
        &Method::GET | &Method::POST => {
            let mut res = next.run(req).await;
            apply_headers(res.headers_mut());
            res
        }
        _ => {
            tracing::debug!(method = %req.method(), path = %req.uri().path(), "method not allowed");
            ApiError(BeaconError::MethodNotAllowed).into_response()
        }
    }
}
