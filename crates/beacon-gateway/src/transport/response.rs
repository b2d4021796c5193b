//! Error -> HTTP response mapping.
//!
//! Bodies are the bare status text: callers are untrusted and learn nothing
//! about the ingestion pipeline beyond the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use beacon_core::error::{BeaconError, ClientCode};

/// Response wrapper for errors that end a request.
#[derive(Debug)]
pub struct ApiError(pub BeaconError);

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::NotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ClientCode::UnsupportedVersion | ClientCode::Unavailable | ClientCode::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.client_code());
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}
