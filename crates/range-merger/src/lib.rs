//! Component I: the offline range merger (spec §4.I).
//!
//! Grounded on `alerter`'s standalone-binary shape (a `clap::Parser`
//! `Arguments`, a `start(args)` entry point, `main.rs` reduced to the
//! allocator and the `#[tokio::main]` shim) and on `range_staging`'s
//! `RangeFetcher` for the actual cache/neighbor/RPC fallback: the merger
//! needs no logic `RangeFetcher::ensure` doesn't already provide — it is
//! that fallback, driven across every sub-range of an arbitrary block
//! interval instead of a single range the pipeline driver names.

use {
    chain_types::{range_of, BlockNumber, RangeNumber},
    range_staging::{FetchError, RangeFetcher},
    std::sync::Arc,
};

#[derive(clap::Parser)]
pub struct Arguments {
    /// List of JSON-RPC endpoints to fall back across, in order.
    #[clap(long, env, use_value_delimiter = true)]
    pub rpc_endpoints: Vec<url::Url>,

    /// Per-call RPC timeout.
    #[clap(long, env, default_value = "60s", value_parser = humantime::parse_duration)]
    pub rpc_timeout: std::time::Duration,

    /// Directory holding (and to hold) staged artifacts.
    #[clap(long, env)]
    pub data_dir: std::path::PathBuf,

    /// Blocks per range bundle; must match the value the pipeline driver
    /// indexes with.
    #[clap(long, env, default_value = "1000")]
    pub range_size: u64,

    /// First block of the interval to merge (inclusive).
    #[clap(long, env)]
    pub first_block: BlockNumber,

    /// Last block of the interval to merge (inclusive).
    #[clap(long, env)]
    pub last_block: BlockNumber,

    /// Delete consumed per-block artifacts after a successful bundle
    /// write. Spec §9: a policy flag, not a semantic requirement.
    #[clap(long, env)]
    pub delete_consumed_block_artifacts: bool,
}

pub async fn start(args: Arguments) {
    tracing::info!(
        first_block = args.first_block,
        last_block = args.last_block,
        range_size = args.range_size,
        "merging range interval"
    );

    let rpc = Arc::new(rpc_pool::RpcPool::new(args.rpc_endpoints, args.rpc_timeout));
    let store = Arc::new(range_staging::RangeStore::new(&args.data_dir));
    let fetcher = RangeFetcher::new(store, rpc, args.range_size)
        .with_delete_consumed_block_artifacts(args.delete_consumed_block_artifacts);

    match merge_interval(args.first_block, args.last_block, args.range_size, &fetcher).await {
        Ok(merged) => tracing::info!(ranges_merged = merged.len(), "merge complete"),
        Err(err) => {
            tracing::error!(?err, "merge failed");
            std::process::exit(1);
        }
    }
}

/// Merges every sub-range of size `range_size` overlapping
/// `[first_block, last_block]`, via the fetcher's cache/neighbor/RPC
/// fallback. Idempotent: a range whose bundle already exists and is
/// non-empty is a no-op (spec §4.I, delegated to
/// `RangeStore::exists`/`RangeFetcher::ensure`).
pub async fn merge_interval(
    first_block: BlockNumber,
    last_block: BlockNumber,
    range_size: u64,
    fetcher: &RangeFetcher,
) -> Result<Vec<RangeNumber>, FetchError> {
    let first_range = range_of(first_block, range_size);
    let last_range = range_of(last_block, range_size);

    let mut merged = Vec::new();
    let mut range = first_range;
    loop {
        tracing::debug!(%range, "ensuring range is staged");
        fetcher.ensure(range).await?;
        merged.push(range);
        if range == last_range {
            break;
        }
        range = range.next();
    }
    Ok(merged)
}
