//! Beacon ingestion gateway.
//!
//! - Receivers: /form, /api, /json, /csp, /beacon
//! - One writer task owns the sink (file or stdout)
//! - SIGINT/SIGTERM: stop accepting, wait out the grace period, drain, close

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beacon_core::error::{BeaconError, Result};
use beacon_gateway::{
    app_state::AppState, config::Cli, obs::IngestMetrics, router, server, sink, writer,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        // stdout may be the event sink
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = cli.resolve()?;
    let listen = cfg.server.listen_addr()?;
    let grace = Duration::from_millis(cfg.server.shutdown_grace_ms);

    let metrics = Arc::new(IngestMetrics::default());
    let sink = sink::open(&cfg.sink).await?;
    let (writer, writer_task) =
        writer::spawn(sink, cfg.sink.queue_capacity, Arc::clone(&metrics));

    let app = router::build_router(AppState::new(cfg, writer, Arc::clone(&metrics)));

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| BeaconError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "beacon-gateway starting");

    let report =
        server::serve_until(listener, app, writer_task, metrics, grace, shutdown_signal()).await?;
    tracing::info!(written = report.written, "shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
