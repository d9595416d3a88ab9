//! The on-the-wire shape of `trace_replayBlockTransactions(blockNumber,
//! ["stateDiff"])`, and of the on-disk bundle payload (spec §6), which
//! re-uses it verbatim. Deliberately loose (`serde_json::Value` for
//! sub-diffs): the decoder only cares about key presence, never values.

use serde::{Deserialize, Serialize};

/// One block's worth of decoded state diffs, as staged on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDiffs {
    #[serde(rename = "blockNum")]
    pub block_num: u64,
    pub diffs: Vec<TransactionResult>,
}

/// A single transaction's `state_diff` entry, keyed by address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionResult {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(rename = "stateDiff")]
    pub state_diff: std::collections::BTreeMap<String, AccountDiff>,
}

/// Presence of a field is all that's material here; `from`/`to` payloads
/// are carried through untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountDiff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<std::collections::BTreeMap<String, serde_json::Value>>,
}

/// A full range bundle: one entry per block, in ascending block order.
pub type Bundle = Vec<BlockDiffs>;
