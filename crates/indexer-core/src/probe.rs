//! Component H: a read-only composition of `RpcPool::get_latest_block`
//! and `ExpiryStore::last_indexed_range`. Never blocks on or mutates the
//! driver's state (spec §4.H).

use {
    chain_types::{range_of, RangeNumber},
    expiry_store::{analytics::SyncStatus, ExpiryStore},
    rpc_pool::{RpcError, RpcPool},
    std::sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("fetching chain head: {0}")]
    Rpc(#[from] RpcError),
    #[error("reading watermark: {0}")]
    Store(#[from] expiry_store::Error),
}

pub struct SyncProbe {
    rpc: Arc<RpcPool>,
    store: Arc<ExpiryStore>,
    range_size: u64,
    finalized_offset_blocks: u64,
}

impl SyncProbe {
    pub fn new(
        rpc: Arc<RpcPool>,
        store: Arc<ExpiryStore>,
        range_size: u64,
        finalized_offset_blocks: u64,
    ) -> Self {
        Self {
            rpc,
            store,
            range_size,
            finalized_offset_blocks,
        }
    }

    /// Reports the committed watermark against the range the chain's
    /// current finalized tip would target, per spec §6's
    /// `GET /api/v1/sync` shape.
    pub async fn status(&self) -> Result<SyncStatus, ProbeError> {
        let latest = self.rpc.get_latest_block().await?;
        let finalized = latest.saturating_sub(self.finalized_offset_blocks);
        let target_range = range_of(finalized, self.range_size);
        Ok(self.store.sync_status(target_range).await?)
    }

    /// `range_of(0) = 0`; an offset larger than the chain height idles
    /// without error rather than underflowing (spec §8 boundary case).
    pub fn target_range_for(&self, latest: chain_types::BlockNumber) -> RangeNumber {
        let finalized = latest.saturating_sub(self.finalized_offset_blocks);
        range_of(finalized, self.range_size)
    }
}
