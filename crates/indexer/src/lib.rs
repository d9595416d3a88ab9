//! Component G's binary wiring: builds every collaborator the pipeline
//! driver needs, runs it alongside the analytics HTTP surface and the
//! metrics/liveness server under one shared cancellation scope, and maps
//! the error taxonomy of spec §7 to the process exit codes of spec §6.
//!
//! Grounded on `autopilot::{main.rs, lib.rs, arguments.rs}`'s split
//! between a thin `#[tokio::main]` shim and a `start`/`main` entry point
//! that does the real wiring.

pub mod arguments;

use {
    arguments::Arguments,
    expiry_store::ExpiryStore,
    indexer_core::{DriverConfig, PipelineDriver, SyncProbe},
    range_staging::{RangeFetcher, RangeStore},
    rpc_pool::RpcPool,
    std::{sync::Arc, time::Duration},
    tokio_util::sync::CancellationToken,
};

/// Configuration rejected at startup (spec §7's "Validation" error kind):
/// fatal, maps to exit code 1.
pub const EXIT_CONFIG_ERROR: i32 = 1;
/// The watermark and event tables disagree (spec §7's "Integrity" error
/// kind): fatal, requires operator intervention, maps to exit code 2.
pub const EXIT_DIRTY_STATE: i32 = 2;
pub const EXIT_OK: i32 = 0;

struct Liveness;

#[async_trait::async_trait]
impl observe::metrics::LivenessChecking for Liveness {
    async fn is_alive(&self) -> bool {
        true
    }
}

/// Runs until shut down by SIGINT/SIGTERM, returning the process exit code
/// to use (spec §6).
pub async fn start(args: Arguments) -> i32 {
    if args.rpc_endpoints.is_empty() {
        tracing::error!("rpc_endpoints must not be empty");
        return EXIT_CONFIG_ERROR;
    }

    let rpc = Arc::new(RpcPool::new(args.rpc_endpoints.clone(), args.rpc_timeout));
    let range_store = Arc::new(RangeStore::new(&args.data_dir).with_compression(args.compression_enabled));
    let fetcher = Arc::new(RangeFetcher::new(
        range_store.clone(),
        rpc.clone(),
        args.range_size,
    ));
    let expiry_store = Arc::new(ExpiryStore::new(
        clickhouse::Client::default().with_url(args.clickhouse_url.as_str()),
        args.range_size,
    ));

    match expiry_store.verify_consistency().await {
        Ok(()) => {}
        Err(err @ expiry_store::Error::Integrity { .. }) => {
            tracing::error!(?err, "watermark and event tables disagree, manual repair required");
            return EXIT_DIRTY_STATE;
        }
        Err(err) => {
            tracing::warn!(?err, "could not verify store consistency at startup, continuing");
        }
    }

    let shutdown = CancellationToken::new();

    let driver_config = DriverConfig {
        range_size: args.range_size,
        poll_interval: args.poll_interval,
        commit_threshold: args.commit_threshold,
        finalized_offset_blocks: args.finalized_offset_blocks,
        ..DriverConfig::default()
    };
    let driver = Arc::new(PipelineDriver::new(
        rpc.clone(),
        fetcher,
        range_store,
        expiry_store.clone(),
        args.genesis_file.clone(),
        driver_config,
        shutdown.clone(),
    ));
    let probe = Arc::new(SyncProbe::new(
        rpc.clone(),
        expiry_store.clone(),
        args.range_size,
        args.finalized_offset_blocks,
    ));

    let driver_task = tokio::spawn({
        let driver = driver.clone();
        async move {
            driver.run_forever().await;
        }
    });
    let api_task = tokio::spawn(indexer_api::serve(
        args.api_address,
        expiry_store,
        rpc,
        probe,
        shutdown.clone(),
    ));
    let metrics_task = observe::metrics::serve_metrics(Arc::new(Liveness), args.metrics_address);

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, draining");
    shutdown.cancel();

    let drain = async {
        let _ = driver_task.await;
        let _ = api_task.await;
    };
    if tokio::time::timeout(args.shutdown_timeout, drain).await.is_err() {
        tracing::warn!(timeout = ?args.shutdown_timeout, "graceful shutdown timed out, exiting anyway");
    }
    metrics_task.abort();

    EXIT_OK
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    tracing::info!("received CTRL+C");
}

pub fn init_tracing(log_level: arguments::LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_directive())),
        )
        .init();
}
