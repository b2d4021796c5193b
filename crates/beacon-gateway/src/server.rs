//! Serve loop and graceful shutdown.
//!
//! Order on shutdown: readiness flips to draining, the listener stops
//! accepting, in-flight requests get up to `grace` to finish, then the writer
//! drains its queue and closes the sink. A writer that stops on its own ends
//! the serve loop with its error.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use beacon_core::error::{BeaconError, Result};

use crate::obs::IngestMetrics;
use crate::writer::{WriterReport, WriterTask};

/// Serve `app` on `listener` until `signal` resolves, then drain.
///
/// Returns the writer's final report once every accepted event is persisted
/// and the sink is closed.
pub async fn serve_until<S>(
    listener: TcpListener,
    app: Router,
    mut writer: WriterTask,
    metrics: Arc<IngestMetrics>,
    grace: Duration,
    signal: S,
) -> Result<WriterReport>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (signal_tx, signal_rx) = watch::channel(false);
    tokio::spawn(async move {
        signal.await;
        metrics.set_draining();
        let _ = signal_tx.send(true);
    });

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signalled(signal_rx.clone()))
    .into_future();

    let grace_elapsed = async move {
        signalled(signal_rx).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        res = server => {
            res.map_err(|e| BeaconError::Internal(format!("server failed: {e}")))?;
        }
        _ = grace_elapsed => {
            tracing::warn!(?grace, "grace period elapsed, abandoning open connections");
        }
        res = writer.stopped() => {
            // the writer only ends on its own when the sink failed
            return Err(match res {
                Err(e) => e,
                Ok(report) => BeaconError::Internal(format!(
                    "writer stopped unexpectedly after {} events",
                    report.written
                )),
            });
        }
    }

    writer.shutdown().await
}

async fn signalled(mut rx: watch::Receiver<bool>) {
    // sender dropped without signalling: never shut down from here
    if rx.wait_for(|fired| *fired).await.is_err() {
        std::future::pending::<()>().await;
    }
}
