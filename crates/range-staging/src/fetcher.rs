//! Component C: `ensure(R)` makes sure a range bundle is staged, preferring
//! cached per-block artifacts over a fresh RPC call, and never writing a
//! partial bundle (spec §4.C: "either the range is fully staged or not at
//! all").

use {
    crate::store::{read_bundle_file, RangeStore, StoreError},
    chain_types::{range_bounds, BlockNumber, RangeNumber},
    rpc_pool::{RpcError, RpcPool},
    state_diff::BlockDiffs,
    std::sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetching block {block} for range {range}: {source}")]
    Rpc {
        range: RangeNumber,
        block: BlockNumber,
        #[source]
        source: RpcError,
    },
    #[error("staging range {range}: {source}")]
    Store {
        range: RangeNumber,
        #[source]
        source: StoreError,
    },
}

/// Drives the Range Store and RPC Pool to guarantee a range is staged.
/// Cached per-block artifacts may be deleted after a successful bundle
/// write; this is a policy flag, not a semantic requirement (spec §9).
pub struct RangeFetcher {
    store: Arc<RangeStore>,
    rpc: Arc<RpcPool>,
    range_size: u64,
    delete_consumed_block_artifacts: bool,
}

impl RangeFetcher {
    pub fn new(store: Arc<RangeStore>, rpc: Arc<RpcPool>, range_size: u64) -> Self {
        Self {
            store,
            rpc,
            range_size,
            delete_consumed_block_artifacts: false,
        }
    }

    pub fn with_delete_consumed_block_artifacts(mut self, delete: bool) -> Self {
        self.delete_consumed_block_artifacts = delete;
        self
    }

    /// Ensures range `R`'s bundle exists on disk, fetching missing blocks
    /// as needed. Returns immediately if the bundle is already staged.
    pub async fn ensure(&self, range: RangeNumber) -> Result<(), FetchError> {
        if self.store.exists(range, self.range_size).await {
            return Ok(());
        }

        let (first, last) = range_bounds(range, self.range_size);
        let mut bundle = Vec::with_capacity((last - first + 1) as usize);
        let mut consumed_artifacts = Vec::new();

        for block in first..=last {
            let (diffs, consumed_path) = self.obtain_block(range, block).await?;
            bundle.push(BlockDiffs {
                block_num: block,
                diffs,
            });
            if let Some(path) = consumed_path {
                consumed_artifacts.push(path);
            }
        }

        self.store
            .write(range, self.range_size, &bundle)
            .await
            .map_err(|source| FetchError::Store { range, source })?;

        if self.delete_consumed_block_artifacts {
            for path in consumed_artifacts {
                if let Err(err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(?path, ?err, "failed to delete consumed per-block artifact");
                }
            }
        }

        Ok(())
    }

    /// Tries a cached legacy per-block artifact first, falling back to the
    /// RPC pool (spec §4.C steps 1-2). Returns the path of the consumed
    /// artifact, if any, so the caller can optionally clean it up.
    async fn obtain_block(
        &self,
        range: RangeNumber,
        block: BlockNumber,
    ) -> Result<(Vec<state_diff::TransactionResult>, Option<std::path::PathBuf>), FetchError> {
        for compressed in [true, false] {
            let path = self.store.legacy_block_path(block, compressed);
            match read_bundle_file(&path).await {
                Ok(mut cached) if cached.len() == 1 => {
                    return Ok((cached.remove(0).diffs, Some(path)));
                }
                Ok(_) | Err(StoreError::Corrupt { .. }) | Err(StoreError::Io { .. }) => continue,
            }
        }

        let diffs = self
            .rpc
            .get_state_diff(block)
            .await
            .map_err(|source| FetchError::Rpc {
                range,
                block,
                source,
            })?;
        Ok((diffs, None))
    }
}
