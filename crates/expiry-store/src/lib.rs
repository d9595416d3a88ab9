//! Component F: the committer and read-side analytics store.
//!
//! Grounded on `database::last_processed_block`'s upsert-watermark pattern
//! and `database::events`'s append-only insert shape, re-targeted at
//! ClickHouse instead of Postgres because the spec's `argMax`-style
//! "latest access per address" queries and `PARTITION BY block / 1e6`
//! layout are native `MergeTree` idioms a row-store can't express directly
//! (see `DESIGN.md`).

pub mod analytics;
mod rows;
pub mod schema;

use {
    access_aggregate::RangeAggregate,
    analytics::{ExpiryReport, SyncStatus},
    chain_types::{range_bounds, BlockNumber, RangeNumber},
    clickhouse::Client,
    rows::{
        AccountEventRow,
        AccountExpiryRow,
        ExpiredContractRow,
        MaxBlockRow,
        MetadataRow,
        MetadataValue,
        StorageEventRow,
        StorageExpiryRow,
    },
};

const WATERMARK_KEY: &str = "last_indexed_range";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("clickhouse query failed: {0}")]
    Query(#[from] clickhouse::error::Error),
    /// Spec §7's one fatal runtime condition: the watermark and the event
    /// tables disagree about what's been committed.
    #[error(
        "dirty state: watermark is range {watermark} (blocks <= {watermark_end}) but event \
         tables contain data up to block {observed_max_block}"
    )]
    Integrity {
        watermark: RangeNumber,
        watermark_end: BlockNumber,
        observed_max_block: BlockNumber,
    },
}

/// The committer / analytics store. One instance is shared by the driver
/// (writer) and the sync probe / analytics server (readers); ClickHouse
/// itself serializes concurrent access to the underlying tables.
pub struct ExpiryStore {
    client: Client,
    range_size: u64,
}

impl ExpiryStore {
    pub fn new(client: Client, range_size: u64) -> Self {
        Self { client, range_size }
    }

    /// Applies every touch in `aggregate` and advances the watermark to
    /// `range`. Spec §4.F's atomicity requirement is emulated rather than
    /// backed by a native multi-table transaction (ClickHouse has none):
    /// events are inserted first, the watermark row last, and every insert
    /// is idempotent on retry because duplicate rows for the same key carry
    /// identical values and the read side dedups via `argMax` (see
    /// `DESIGN.md`). A crash between the two insert steps leaves the
    /// watermark at its old value; the next call re-inserts the same rows
    /// and finishes advancing it, converging to the same final state.
    pub async fn commit(&self, range: RangeNumber, aggregate: &RangeAggregate) -> Result<(), Error> {
        assert_eq!(
            aggregate.range(),
            range,
            "committing aggregate for the wrong range"
        );

        let mut account_insert = self.client.insert::<AccountEventRow>("account_events")?;
        for (address, block, is_contract) in aggregate.account_touches() {
            account_insert
                .write(&AccountEventRow::new(address, block, is_contract))
                .await?;
        }
        account_insert.end().await?;

        let mut storage_insert = self.client.insert::<StorageEventRow>("storage_events")?;
        for (address, slot, block) in aggregate.storage_touches() {
            storage_insert
                .write(&StorageEventRow::new(address, slot, block))
                .await?;
        }
        storage_insert.end().await?;

        let mut metadata_insert = self.client.insert::<MetadataRow>("metadata")?;
        metadata_insert
            .write(&MetadataRow {
                key: WATERMARK_KEY,
                value: range.get().to_string(),
            })
            .await?;
        metadata_insert.end().await?;

        Ok(())
    }

    /// The highest range fully committed; absent ⇔ zero (spec §6).
    pub async fn last_indexed_range(&self) -> Result<RangeNumber, Error> {
        Ok(self.last_indexed_range_if_present().await?.unwrap_or(RangeNumber(0)))
    }

    /// Distinguishes "watermark row present with value 0" (genesis
    /// committed, nothing else yet) from "no watermark row at all" (the
    /// pipeline driver's "no genesis marker" condition, spec §4.G's state
    /// machine). `last_indexed_range` collapses both to zero for ordinary
    /// callers; only the driver's bootstrap decision needs to tell them
    /// apart.
    pub async fn last_indexed_range_if_present(&self) -> Result<Option<RangeNumber>, Error> {
        let row = self
            .client
            .query("SELECT value FROM metadata WHERE key = ? ORDER BY updated_at DESC LIMIT 1")
            .bind(WATERMARK_KEY)
            .fetch_optional::<MetadataValue>()
            .await?;
        Ok(row.map(|row| RangeNumber(row.value.parse().unwrap_or(0))))
    }

    /// Checks the one condition spec §7 calls fatal: event data visible
    /// beyond what the watermark claims to have committed. A clean restart
    /// after a mid-commit crash never trips this, because the watermark
    /// insert is the last step of `commit` — if it lags, the event tables
    /// simply contain the redo of the in-progress range, which `block <=
    /// watermark_end` still satisfies once that commit finishes.
    pub async fn verify_consistency(&self) -> Result<(), Error> {
        let watermark = self.last_indexed_range().await?;
        let (_, watermark_end) = range_bounds(watermark, self.range_size);

        let observed_max_block = self.max_committed_block().await?;
        if observed_max_block > watermark_end {
            return Err(Error::Integrity {
                watermark,
                watermark_end,
                observed_max_block,
            });
        }
        Ok(())
    }

    async fn max_committed_block(&self) -> Result<BlockNumber, Error> {
        let account_max = self
            .client
            .query("SELECT max(block) AS max_block FROM account_events")
            .fetch_optional::<MaxBlockRow>()
            .await?
            .map(|row| row.max_block)
            .unwrap_or(0);
        let storage_max = self
            .client
            .query("SELECT max(block) AS max_block FROM storage_events")
            .fetch_optional::<MaxBlockRow>()
            .await?
            .map(|row| row.max_block)
            .unwrap_or(0);
        Ok(account_max.max(storage_max))
    }

    pub async fn sync_status(&self, target_range: RangeNumber) -> Result<SyncStatus, Error> {
        let last_indexed_range = self.last_indexed_range().await?;
        Ok(analytics::sync_status(
            last_indexed_range,
            target_range,
            self.range_size,
        ))
    }

    /// Component F's analytics query (spec §4.F): latest access per address
    /// / slot via `argMax(block)`, expired vs active splits, a top-N
    /// contract ranking, and a blocks-since-touch distribution.
    pub async fn analytics(
        &self,
        expiry_block: BlockNumber,
        current_block: BlockNumber,
    ) -> Result<ExpiryReport, Error> {
        let account_rows = self
            .client
            .query(
                "SELECT address, argMax(is_contract, block) AS is_contract, max(block) AS \
                 last_block FROM account_events GROUP BY address",
            )
            .fetch_all::<AccountExpiryRow>()
            .await?;
        let accounts = analytics::build_account_counts(&account_rows, expiry_block);

        let storage_rows = self
            .client
            .query(
                "SELECT address, slot, max(block) AS last_block FROM storage_events GROUP BY \
                 address, slot",
            )
            .fetch_all::<StorageExpiryRow>()
            .await?;
        let (expired_storage_slots, active_storage_slots) =
            analytics::build_storage_counts(&storage_rows, expiry_block);
        let distribution = analytics::build_distribution(&storage_rows, expiry_block, current_block);

        let top_contracts = self
            .client
            .query(
                "SELECT address, count(*) AS expired_slot_count FROM (SELECT address, slot, \
                 max(block) AS last_block FROM storage_events GROUP BY address, slot) WHERE \
                 last_block <= ? GROUP BY address ORDER BY expired_slot_count DESC LIMIT ?",
            )
            .bind(expiry_block)
            .bind(analytics::TOP_N_CONTRACTS as u64)
            .fetch_all::<ExpiredContractRow>()
            .await?;

        Ok(ExpiryReport {
            expiry_block,
            current_block,
            accounts,
            expired_storage_slots,
            active_storage_slots,
            top_expired_contracts: analytics::build_top_contracts(top_contracts),
            distribution,
        })
    }
}
