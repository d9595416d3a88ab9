//! Component D: turns one transaction's `state_diff` into typed touches.
//!
//! Pure and allocation-light by design — the aggregator (component E) is
//! the only thing that owns memory across blocks; this module never does.

mod wire;

pub use wire::{AccountDiff, BlockDiffs, Bundle, TransactionResult};

use chain_types::{Address, StorageSlot};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed address {0:?} in state diff")]
    MalformedAddress(String),
    #[error("malformed storage slot {0:?} in state diff")]
    MalformedSlot(String),
}

/// One account touch: the address was named, and whether it is now known
/// to be a contract (per the presence of a structured `code` sub-diff).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountTouch {
    pub address: Address,
    pub is_contract: bool,
}

/// One storage-slot touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageTouch {
    pub address: Address,
    pub slot: StorageSlot,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedTouches {
    pub accounts: Vec<AccountTouch>,
    pub storage: Vec<StorageTouch>,
}

/// Returns true iff `code` is present and carries a structured `from`/`to`
/// payload rather than `null` (spec §4.D).
fn code_is_structured(diff: &AccountDiff) -> bool {
    matches!(&diff.code, Some(value) if !value.is_null())
}

/// Decodes a single transaction's `state_diff` map.
pub fn decode_transaction(tx: &TransactionResult) -> Result<DecodedTouches, DecodeError> {
    let mut out = DecodedTouches::default();
    for (address_str, diff) in &tx.state_diff {
        let address: Address = address_str
            .parse()
            .map_err(|_| DecodeError::MalformedAddress(address_str.clone()))?;

        out.accounts.push(AccountTouch {
            address,
            is_contract: code_is_structured(diff),
        });

        if let Some(storage) = &diff.storage {
            for slot_str in storage.keys() {
                let slot: StorageSlot = slot_str
                    .parse()
                    .map_err(|_| DecodeError::MalformedSlot(slot_str.clone()))?;
                out.storage.push(StorageTouch { address, slot });
            }
        }
    }
    Ok(out)
}

/// Decodes every transaction of one staged block, in transaction order.
pub fn decode_block(block: &BlockDiffs) -> Result<DecodedTouches, DecodeError> {
    let mut out = DecodedTouches::default();
    for tx in &block.diffs {
        let decoded = decode_transaction(tx)?;
        out.accounts.extend(decoded.accounts);
        out.storage.extend(decoded.storage);
    }
    Ok(out)
}
