#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::PathBuf;

use beacon_gateway::config::{self, Cli, SinkKind};
use clap::Parser;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
sink:
  kind: file
  pathh: "events.jsonl" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.sink.kind, SinkKind::Stdout);
    assert_eq!(cfg.sink.queue_capacity, 1024);
    assert_eq!(cfg.server.max_body_bytes, 1 << 20);
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 8080);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn file_sink_requires_path() {
    let err = config::load_from_str("version: 1\nsink:\n  kind: file\n").expect_err("must fail");
    assert!(err.to_string().contains("sink.path"));
}

#[test]
fn range_checks() {
    for bad in [
        "version: 1\nserver:\n  request_timeout_ms: 10\n",
        "version: 1\nserver:\n  shutdown_grace_ms: 999999\n",
        "version: 1\nserver:\n  max_body_bytes: 0\n",
        "version: 1\nserver:\n  listen: \"nowhere\"\n",
        "version: 1\nserver:\n  redirect_url: \"ftp://x\"\n",
        "version: 1\nsink:\n  queue_capacity: 0\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "{bad}");
    }
}

#[test]
fn go_style_port_only_listen() {
    let cfg = config::load_from_str("version: 1\nserver:\n  listen: \":9090\"\n").unwrap();
    assert_eq!(cfg.server.listen_addr().unwrap().to_string(), "0.0.0.0:9090");
}

#[test]
fn flags_override_defaults() {
    let cli = Cli::try_parse_from(["beacon-gateway", "--addr", ":7000", "--data", "/tmp/ev.jsonl"]).unwrap();
    let cfg = cli.resolve().unwrap();
    assert_eq!(cfg.server.listen, ":7000");
    assert_eq!(cfg.sink.kind, SinkKind::File);
    assert_eq!(cfg.sink.path, Some(PathBuf::from("/tmp/ev.jsonl")));
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beacon.yaml");
    std::fs::write(
        &path,
        "version: 1\nsink:\n  kind: file\n  path: \"from-file.jsonl\"\n  queue_capacity: 16\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from(["beacon-gateway", "--config", path.to_str().unwrap(), "--stdout"]).unwrap();
    let cfg = cli.resolve().unwrap();
    assert_eq!(cfg.sink.kind, SinkKind::Stdout);
    assert_eq!(cfg.sink.path, None);
    assert_eq!(cfg.sink.queue_capacity, 16);
}

#[test]
fn data_and_stdout_conflict() {
    assert!(Cli::try_parse_from(["beacon-gateway", "--data", "x", "--stdout"]).is_err());
}
