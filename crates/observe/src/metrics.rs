//! The `/metrics` and `/health` endpoints every long-running binary in the
//! workspace exposes, independent of whatever domain-specific HTTP API (if
//! any) it also serves.

use {
    axum::{extract::State, http::StatusCode, routing::get, Router},
    prometheus::{Encoder, TextEncoder},
    std::{net::SocketAddr, sync::Arc},
};

/// A binary's notion of "still making progress", checked by `/health`.
/// Distinct from process liveness (the process is always "up" if it can
/// answer the request at all) — this answers whether it's stuck.
#[async_trait::async_trait]
pub trait LivenessChecking: Send + Sync {
    async fn is_alive(&self) -> bool;
}

/// Spawns the metrics/health server as a detached background task and
/// returns its handle. Callers generally don't await it directly; it runs
/// for the life of the process.
pub fn serve_metrics(
    liveness: Arc<dyn LivenessChecking>,
    address: SocketAddr,
) -> tokio::task::JoinHandle<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(liveness);

    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(address).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(%address, ?err, "failed to bind metrics server");
                return;
            }
        };
        tracing::info!(%address, "serving metrics");
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(?err, "metrics server exited");
        }
    })
}

async fn metrics_handler() -> (StatusCode, String) {
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            String::from_utf8(buffer).unwrap_or_default(),
        ),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn health_handler(State(liveness): State<Arc<dyn LivenessChecking>>) -> StatusCode {
    if liveness.is_alive().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
