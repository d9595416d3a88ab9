//! Ambient HTTP surface over the committed store (spec §6's "Analytics
//! surface"). The core spec treats this as an external, read-only
//! collaborator; grounded on `autopilot::infra::api`'s thin axum-router
//! style (`Router` + `with_state`, one handler per route, errors mapped
//! to status codes at the edge).

mod dto;
mod error;

use {
    axum::{
        extract::{Query, State as AxumState},
        response::{IntoResponse, Json, Response},
        routing::get,
        Router,
    },
    chain_types::BlockNumber,
    error::ApiError,
    expiry_store::ExpiryStore,
    indexer_core::SyncProbe,
    rpc_pool::RpcPool,
    serde::Deserialize,
    std::{net::SocketAddr, sync::Arc},
    tokio_util::sync::CancellationToken,
};

#[derive(Clone)]
struct AppState {
    store: Arc<ExpiryStore>,
    rpc: Arc<RpcPool>,
    probe: Arc<SyncProbe>,
}

/// Serves the analytics API until `shutdown` fires, bounded by the
/// graceful-shutdown timeout the caller applies around this future (spec
/// §5: "bounded (default 10s) before forced exit of the analytics
/// server").
pub async fn serve(
    addr: SocketAddr,
    store: Arc<ExpiryStore>,
    rpc: Arc<RpcPool>,
    probe: Arc<SyncProbe>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let state = AppState { store, rpc, probe };
    let app = Router::new()
        .route("/api/v1/sync", get(get_sync_status))
        .route("/api/v1/stats/analytics", get(get_analytics))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving analytics api");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn get_sync_status(AxumState(state): AxumState<AppState>) -> Response {
    match state.probe.status().await {
        Ok(status) => Json(dto::SyncStatusResponse::from(status)).into_response(),
        Err(indexer_core::probe::ProbeError::Rpc(err)) => ApiError::Rpc(err).into_response(),
        Err(indexer_core::probe::ProbeError::Store(err)) => ApiError::Store(err).into_response(),
    }
}

#[derive(Deserialize)]
struct AnalyticsQuery {
    expiry_block: Option<String>,
}

async fn get_analytics(
    AxumState(state): AxumState<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    match handle_analytics(state, query).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn handle_analytics(state: AppState, query: AnalyticsQuery) -> Result<Response, ApiError> {
    let raw = query.expiry_block.ok_or_else(|| ApiError::BadQuery {
        name: "expiry_block",
        reason: "missing required parameter".into(),
    })?;
    let expiry_block: BlockNumber = raw.parse().map_err(|_| ApiError::BadQuery {
        name: "expiry_block",
        reason: format!("{raw:?} is not a valid block number"),
    })?;

    let current_block = state.rpc.get_latest_block().await?;
    let report = state.store.analytics(expiry_block, current_block).await?;
    Ok(Json(dto::AnalyticsResponse::from(report)).into_response())
}
