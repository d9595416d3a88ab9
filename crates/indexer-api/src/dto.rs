//! Wire shapes for the analytics HTTP surface (spec §6). Deliberately
//! distinct from `expiry_store::analytics`'s internal types: addresses are
//! rendered as `0x`-hex strings and field names match the spec's
//! `camelCase`-free JSON shape rather than the store's Rust naming.

use {
    chain_types::{Address, BlockNumber},
    expiry_store::analytics::{AccountExpiryCounts, DistributionBucket, ExpiryReport, SyncStatus},
    serde::Serialize,
};

#[derive(Serialize)]
pub struct SyncStatusResponse {
    pub last_indexed_range: u64,
    pub end_block: BlockNumber,
    pub target_range: u64,
    pub is_synced: bool,
}

impl From<SyncStatus> for SyncStatusResponse {
    fn from(status: SyncStatus) -> Self {
        Self {
            last_indexed_range: status.last_indexed_range.get(),
            end_block: status.end_block,
            target_range: status.target_range.get(),
            is_synced: status.is_synced,
        }
    }
}

#[derive(Serialize)]
pub struct AccountExpiryCountsResponse {
    pub expired_eoas: u64,
    pub active_eoas: u64,
    pub expired_contracts: u64,
    pub active_contracts: u64,
}

impl From<AccountExpiryCounts> for AccountExpiryCountsResponse {
    fn from(counts: AccountExpiryCounts) -> Self {
        Self {
            expired_eoas: counts.expired_eoas,
            active_eoas: counts.active_eoas,
            expired_contracts: counts.expired_contracts,
            active_contracts: counts.active_contracts,
        }
    }
}

#[derive(Serialize)]
pub struct TopExpiredContractResponse {
    pub address: Address,
    pub expired_slot_count: u64,
}

#[derive(Serialize)]
pub struct DistributionBucketResponse {
    pub blocks_since_touch_from: u64,
    pub blocks_since_touch_to: Option<u64>,
    pub count: u64,
}

impl From<DistributionBucket> for DistributionBucketResponse {
    fn from(bucket: DistributionBucket) -> Self {
        Self {
            blocks_since_touch_from: bucket.blocks_since_touch_from,
            blocks_since_touch_to: bucket.blocks_since_touch_to,
            count: bucket.count,
        }
    }
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub expiry_block: BlockNumber,
    pub current_block: BlockNumber,
    pub accounts: AccountExpiryCountsResponse,
    pub expired_storage_slots: u64,
    pub active_storage_slots: u64,
    pub top_expired_contracts: Vec<TopExpiredContractResponse>,
    pub distribution: Vec<DistributionBucketResponse>,
}

impl From<ExpiryReport> for AnalyticsResponse {
    fn from(report: ExpiryReport) -> Self {
        Self {
            expiry_block: report.expiry_block,
            current_block: report.current_block,
            accounts: report.accounts.into(),
            expired_storage_slots: report.expired_storage_slots,
            active_storage_slots: report.active_storage_slots,
            top_expired_contracts: report
                .top_expired_contracts
                .into_iter()
                .map(|contract| TopExpiredContractResponse {
                    address: contract.address,
                    expired_slot_count: contract.expired_slot_count,
                })
                .collect(),
            distribution: report.distribution.into_iter().map(Into::into).collect(),
        }
    }
}
