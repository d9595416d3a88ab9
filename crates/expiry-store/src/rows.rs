//! Wire shapes for ClickHouse inserts and query results. `FixedString(20)`
//! / `FixedString(32)` columns round-trip as raw byte arrays, so these
//! mirror `chain_types::Address`/`StorageSlot` without the hex formatting.

use {
    chain_types::{Address, BlockNumber, StorageSlot},
    clickhouse::Row,
    serde::{Deserialize, Serialize},
};

#[derive(Row, Serialize)]
pub struct AccountEventRow {
    pub block: u64,
    pub address: [u8; 20],
    pub is_contract: bool,
}

impl AccountEventRow {
    pub fn new(address: Address, block: BlockNumber, is_contract: bool) -> Self {
        Self {
            block,
            address: *address.as_bytes(),
            is_contract,
        }
    }
}

#[derive(Row, Serialize)]
pub struct StorageEventRow {
    pub block: u64,
    pub address: [u8; 20],
    pub slot: [u8; 32],
}

impl StorageEventRow {
    pub fn new(address: Address, slot: StorageSlot, block: BlockNumber) -> Self {
        Self {
            block,
            address: *address.as_bytes(),
            slot: *slot.as_bytes(),
        }
    }
}

#[derive(Row, Serialize)]
pub struct MetadataRow<'a> {
    pub key: &'a str,
    pub value: String,
}

#[derive(Row, Deserialize)]
pub struct MetadataValue {
    pub value: String,
}

#[derive(Row, Deserialize)]
pub struct AccountExpiryRow {
    pub address: [u8; 20],
    pub is_contract: bool,
    pub last_block: u64,
}

#[derive(Row, Deserialize)]
pub struct StorageExpiryRow {
    pub address: [u8; 20],
    pub slot: [u8; 32],
    pub last_block: u64,
}

#[derive(Row, Deserialize)]
pub struct ExpiredContractRow {
    pub address: [u8; 20],
    pub expired_slot_count: u64,
}

#[derive(Row, Deserialize)]
pub struct MaxBlockRow {
    pub max_block: u64,
}
