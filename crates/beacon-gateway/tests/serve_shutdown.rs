//! Serve loop over a real socket: signal, drain, close.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use beacon_core::protocol::line::decode_line;
use beacon_core::Record;
use beacon_gateway::{
    app_state::AppState,
    config::{IngestConfig, SinkKind, SinkSection},
    obs::IngestMetrics,
    router::build_router,
    server::serve_until,
    sink::{self, MemorySink},
    writer,
};

/// One HTTP/1.1 form POST on a fresh connection; returns the raw response.
async fn post_form(addr: SocketAddr, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!(
        "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut res = String::new();
    stream.read_to_string(&mut res).await.unwrap();
    res
}

#[tokio::test]
async fn signal_drains_accepted_events_and_closes_the_listener() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let mut cfg = IngestConfig::default();
    cfg.sink = SinkSection {
        kind: SinkKind::File,
        path: Some(path.clone()),
        queue_capacity: 4,
    };

    let metrics = Arc::new(IngestMetrics::default());
    let sink = sink::open(&cfg.sink).await.unwrap();
    let (handle, task) = writer::spawn(sink, cfg.sink.queue_capacity, Arc::clone(&metrics));
    let app = build_router(AppState::new(cfg, handle, Arc::clone(&metrics)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(serve_until(
        listener,
        app,
        task,
        Arc::clone(&metrics),
        Duration::from_secs(5),
        async move {
            let _ = stop_rx.await;
        },
    ));

    for i in 0..10 {
        let res = post_form(addr, "/form", &format!("trigger=load&src=%2Fp%2F{i}&dur={i}")).await;
        assert!(res.starts_with("HTTP/1.1 204"), "{res}");
    }
    assert!(!metrics.is_draining());

    stop_tx.send(()).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(10), serving)
        .await
        .expect("serve loop did not stop")
        .unwrap()
        .unwrap();
    assert_eq!(report.written, 10);
    assert!(metrics.is_draining());

    // no longer accepting
    assert!(TcpStream::connect(addr).await.is_err());

    let text = std::fs::read_to_string(&path).unwrap();
    let mut srcs: Vec<String> = text
        .lines()
        .map(|l| match decode_line(l.as_bytes()).unwrap().record() {
            Record::Form(f) => f.src.clone(),
            other => panic!("unexpected record {other:?}"),
        })
        .collect();
    srcs.sort();
    let mut want: Vec<String> = (0..10).map(|i| format!("/p/{i}")).collect();
    want.sort();
    assert_eq!(srcs, want);
}

#[tokio::test]
async fn sink_failure_ends_serving_without_a_signal() {
    let (sink, reader) = MemorySink::failing_after(0);
    let metrics = Arc::new(IngestMetrics::default());
    let (handle, task) = writer::spawn(Box::new(sink), 8, Arc::clone(&metrics));
    let app = build_router(AppState::new(IngestConfig::default(), handle, Arc::clone(&metrics)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serving = tokio::spawn(serve_until(
        listener,
        app,
        task,
        Arc::clone(&metrics),
        Duration::from_secs(5),
        std::future::pending::<()>(),
    ));

    let res = post_form(addr, "/form", "trigger=ping").await;
    assert!(res.starts_with("HTTP/1.1 204"), "{res}");

    let err = tokio::time::timeout(Duration::from_secs(10), serving)
        .await
        .expect("serve loop kept running after sink failure")
        .unwrap()
        .unwrap_err();
    assert_eq!(err.client_code().as_str(), "INTERNAL");
    assert!(reader.lines().is_empty());
    // the failed sink is left unclosed
    assert_eq!(reader.close_count(), 0);
}
