//! Read-side contract (spec §4.F): sync status and the expiry analytics
//! report. Both derive "latest access" from the event tables via
//! `argMax(block)`-shaped aggregations — the index is analytics-native by
//! construction, not bolted on after the fact.

use {
    crate::rows::{AccountExpiryRow, ExpiredContractRow, StorageExpiryRow},
    chain_types::{range_bounds, Address, BlockNumber, RangeNumber},
};

/// Number of contracts returned by `top_expired_contracts`. The spec leaves
/// this unstandardized (§9 open question c); fixed here for determinism.
pub const TOP_N_CONTRACTS: usize = 10;

/// Edges (in blocks-since-last-touch) of the expiry distribution
/// histogram. Also an implementer's choice per §9 open question (c).
pub const DISTRIBUTION_BUCKET_EDGES: [u64; 4] = [100, 1_000, 10_000, 100_000];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncStatus {
    pub last_indexed_range: RangeNumber,
    pub end_block: BlockNumber,
    pub target_range: RangeNumber,
    pub is_synced: bool,
}

pub fn sync_status(
    last_indexed_range: RangeNumber,
    target_range: RangeNumber,
    range_size: u64,
) -> SyncStatus {
    let (_, end_block) = range_bounds(last_indexed_range, range_size);
    SyncStatus {
        last_indexed_range,
        end_block,
        target_range,
        is_synced: last_indexed_range >= target_range,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountExpiryCounts {
    pub expired_eoas: u64,
    pub active_eoas: u64,
    pub expired_contracts: u64,
    pub active_contracts: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopExpiredContract {
    pub address: Address,
    pub expired_slot_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DistributionBucket {
    /// Inclusive lower bound, in blocks since last touch.
    pub blocks_since_touch_from: u64,
    /// Exclusive upper bound, or `None` for the open-ended final bucket.
    pub blocks_since_touch_to: Option<u64>,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiryReport {
    pub expiry_block: BlockNumber,
    pub current_block: BlockNumber,
    pub accounts: AccountExpiryCounts,
    pub expired_storage_slots: u64,
    pub active_storage_slots: u64,
    pub top_expired_contracts: Vec<TopExpiredContract>,
    pub distribution: Vec<DistributionBucket>,
}

pub(crate) fn build_account_counts(rows: &[AccountExpiryRow], expiry_block: BlockNumber) -> AccountExpiryCounts {
    let mut counts = AccountExpiryCounts {
        expired_eoas: 0,
        active_eoas: 0,
        expired_contracts: 0,
        active_contracts: 0,
    };
    for row in rows {
        let expired = row.last_block <= expiry_block;
        match (row.is_contract, expired) {
            (false, true) => counts.expired_eoas += 1,
            (false, false) => counts.active_eoas += 1,
            (true, true) => counts.expired_contracts += 1,
            (true, false) => counts.active_contracts += 1,
        }
    }
    counts
}

pub(crate) fn build_storage_counts(rows: &[StorageExpiryRow], expiry_block: BlockNumber) -> (u64, u64) {
    let mut expired = 0u64;
    let mut active = 0u64;
    for row in rows {
        if row.last_block <= expiry_block {
            expired += 1;
        } else {
            active += 1;
        }
    }
    (expired, active)
}

pub(crate) fn build_top_contracts(rows: Vec<ExpiredContractRow>) -> Vec<TopExpiredContract> {
    rows.into_iter()
        .map(|row| TopExpiredContract {
            address: Address::from(row.address),
            expired_slot_count: row.expired_slot_count,
        })
        .collect()
}

/// Buckets *active* storage slots by blocks-since-last-touch
/// (`current_block - last_block`); expired slots (by definition past the
/// expiry threshold) don't inform "how close to expiry" buckets.
pub(crate) fn build_distribution(
    rows: &[StorageExpiryRow],
    expiry_block: BlockNumber,
    current_block: BlockNumber,
) -> Vec<DistributionBucket> {
    let edges = DISTRIBUTION_BUCKET_EDGES;
    let mut buckets: Vec<DistributionBucket> = (0..=edges.len())
        .map(|i| DistributionBucket {
            blocks_since_touch_from: if i == 0 { 0 } else { edges[i - 1] },
            blocks_since_touch_to: edges.get(i).copied(),
            count: 0,
        })
        .collect();

    for row in rows {
        if row.last_block <= expiry_block {
            continue;
        }
        let age = current_block.saturating_sub(row.last_block);
        let bucket = buckets
            .iter_mut()
            .find(|b| {
                age >= b.blocks_since_touch_from
                    && b.blocks_since_touch_to.map(|to| age < to).unwrap_or(true)
            })
            .expect("buckets cover the full range");
        bucket.count += 1;
    }
    buckets
}
