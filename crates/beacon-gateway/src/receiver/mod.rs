//! Event receiver: one handler per ingestion endpoint.
//!
//! Each handler turns the request into exactly one [`Event`] or a rejection,
//! hands accepted events to the writer, counts the hit, and answers 204
//! without waiting for the line to be persisted.
//!
//! Rejections never reach the writer: malformed JSON, malformed CSP
//! envelopes, and unparsable beacon durations are answered with 400.
//! Form endpoints instead degrade an unparsable body to an empty field set.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};

use beacon_core::error::Result;
use beacon_core::protocol::csp::parse_report;
use beacon_core::protocol::form::{BeaconFields, FormFields, FormPairs};
use beacon_core::{BeaconError, Event, Record};

use crate::app_state::AppState;
use crate::transport::meta::RequestMeta;
use crate::transport::response::ApiError;

/// `POST /form`: free-text navigation record.
pub async fn form(
    State(app): State<AppState>,
    meta: RequestMeta,
    pairs: std::result::Result<Form<FormPairs>, FormRejection>,
) -> Response {
    let started = Instant::now();
    let record = FormFields::from_pairs(&lenient(pairs)).into_record();
    let outcome = accept(&app, "form", meta, Record::Form(record)).await;
    finish(&app, "form", started, outcome)
}

/// `POST /api`: same record as `/form`, counted separately.
pub async fn api(
    State(app): State<AppState>,
    meta: RequestMeta,
    pairs: std::result::Result<Form<FormPairs>, FormRejection>,
) -> Response {
    let started = Instant::now();
    let record = FormFields::from_pairs(&lenient(pairs)).into_record();
    let outcome = accept(&app, "api", meta, Record::Form(record)).await;
    finish(&app, "api", started, outcome)
}

/// `POST /json`: any syntactically valid JSON document.
pub async fn json(State(app): State<AppState>, meta: RequestMeta, body: Bytes) -> Response {
    let started = Instant::now();
    let outcome = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(data) => accept(&app, "json", meta, Record::Json { data }).await,
        Err(e) => Err(BeaconError::BadRequest(format!("invalid json: {e}"))),
    };
    finish(&app, "json", started, outcome)
}

/// `POST /csp`: `{"csp-report": {...}}` violation report.
pub async fn csp(State(app): State<AppState>, meta: RequestMeta, body: Bytes) -> Response {
    let started = Instant::now();
    let outcome = match parse_report(&body) {
        Ok(report) => accept(&app, "csp", meta, Record::Csp { report }).await,
        Err(e) => Err(e),
    };
    finish(&app, "csp", started, outcome)
}

/// `GET|POST /beacon`: page timing from `navigator.sendBeacon`.
pub async fn beacon(
    State(app): State<AppState>,
    meta: RequestMeta,
    pairs: std::result::Result<Form<FormPairs>, FormRejection>,
) -> Response {
    let started = Instant::now();
    let outcome = match BeaconFields::from_pairs(&lenient(pairs)).into_record() {
        Ok(rec) => accept(&app, "beacon", meta, Record::Beacon(rec)).await,
        Err(e) => Err(e),
    };
    finish(&app, "beacon", started, outcome)
}

/// Form parse failures degrade to an empty field set.
fn lenient(pairs: std::result::Result<Form<FormPairs>, FormRejection>) -> FormPairs {
    match pairs {
        Ok(Form(p)) => p,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "form parse failed, using empty fields");
            FormPairs::new()
        }
    }
}

/// Build the event, hand it to the writer, count the hit.
async fn accept(app: &AppState, endpoint: &'static str, meta: RequestMeta, record: Record) -> Result<()> {
    let event = Event::new(meta.remote, meta.user_agent, record);
    let summary = event.summary();
    let remote = event.remote().to_owned();

    app.writer().submit(event).await?;

    app.metrics().endpoint_hits.inc(&[("endpoint", endpoint)]);
    tracing::info!(endpoint, %remote, "{summary}");
    Ok(())
}

fn finish(app: &AppState, endpoint: &'static str, started: Instant, outcome: Result<()>) -> Response {
    app.metrics()
        .serve_latency
        .observe(&[("endpoint", endpoint)], started.elapsed());

    match outcome {
        Ok(()) => {
            tracing::debug!(endpoint, "served");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            let code = e.client_code().as_str();
            if e.is_client_error() {
                tracing::warn!(endpoint, code, error = %e, "rejected");
            } else {
                tracing::error!(endpoint, code, error = %e, "event not accepted");
            }
            app.metrics()
                .rejections
                .inc(&[("endpoint", endpoint), ("reason", code)]);
            ApiError(e).into_response()
        }
    }
}
