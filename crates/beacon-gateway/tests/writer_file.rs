//! Single-writer guarantees against a real append-mode file.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use futures_util::future::join_all;
use tower::ServiceExt;

use beacon_core::protocol::line::decode_line;
use beacon_core::Record;
use beacon_gateway::{
    app_state::AppState,
    config::{IngestConfig, SinkKind, SinkSection},
    obs::IngestMetrics,
    router::build_router,
    sink,
    writer,
};

fn file_sink_cfg(path: std::path::PathBuf, queue_capacity: usize) -> SinkSection {
    SinkSection {
        kind: SinkKind::File,
        path: Some(path),
        queue_capacity,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_produce_one_intact_line_each() {
    const N: usize = 200;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let mut cfg = IngestConfig::default();
    // a tiny queue forces receivers to wait on the writer
    cfg.sink = file_sink_cfg(path.clone(), 2);

    let metrics = Arc::new(IngestMetrics::default());
    let sink = sink::open(&cfg.sink).await.unwrap();
    let (handle, task) = writer::spawn(sink, cfg.sink.queue_capacity, Arc::clone(&metrics));
    let app = build_router(AppState::new(cfg, handle, Arc::clone(&metrics)));

    let requests = (0..N).map(|i| {
        let app = app.clone();
        tokio::spawn(async move {
            let req = Request::builder()
                .method(Method::POST)
                .uri("/form")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("trigger=load&src=%2Fpage%2F{i}&dur={i}")))
                .unwrap();
            app.oneshot(req).await.unwrap().status()
        })
    });
    for status in join_all(requests).await {
        assert_eq!(status.unwrap(), StatusCode::NO_CONTENT);
    }

    let report = task.shutdown().await.unwrap();
    assert_eq!(report.written, N as u64);
    assert_eq!(metrics.endpoint_hits.get(&[("endpoint", "form")]), N as u64);
    assert_eq!(metrics.events_written.get(&[("sink", "file")]), N as u64);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    let mut seen = BTreeSet::new();
    for line in text.lines() {
        let ev = decode_line(line.as_bytes()).unwrap();
        let Record::Form(f) = ev.record() else { panic!("unexpected record: {line}") };
        assert_eq!(f.src, format!("/page/{}", f.dur));
        seen.insert(f.dur.clone());
    }
    assert_eq!(seen.len(), N);
}

#[tokio::test]
async fn accepted_events_survive_shutdown_and_restart_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let cfg = file_sink_cfg(path.clone(), 1024);

    for round in 0..2 {
        let metrics = Arc::new(IngestMetrics::default());
        let (handle, task) = writer::spawn(sink::open(&cfg).await.unwrap(), 1024, metrics);
        for i in 0..25 {
            let ev = beacon_core::Event::new(
                "127.0.0.1",
                None,
                Record::Json {
                    data: serde_json::json!({ "round": round, "i": i }),
                },
            );
            handle.submit(ev).await.unwrap();
        }
        // shut down immediately: everything queued must still be written
        assert_eq!(task.shutdown().await.unwrap().written, 25);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let rounds: Vec<u64> = text
        .lines()
        .map(|l| match decode_line(l.as_bytes()).unwrap().record() {
            Record::Json { data } => data["round"].as_u64().unwrap(),
            other => panic!("unexpected record {other:?}"),
        })
        .collect();
    assert_eq!(rounds.len(), 50);
    assert!(rounds[..25].iter().all(|r| *r == 0));
    assert!(rounds[25..].iter().all(|r| *r == 1));
}

#[tokio::test]
async fn missing_directory_is_fatal_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = file_sink_cfg(dir.path().join("nope").join("events.jsonl"), 8);
    let err = sink::open(&cfg).await.err().unwrap();
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}
