//! This module is responsible for associating auction ids with transaction hashes.
//!
//! see database/sql/V037__auction_transaction.sql
//!
//! When we put settlement transactions on chain there is no reliable way to know the transaction
//! hash because we can create multiple transactions with different gas prices. What we do know is
//! the account and nonce that the transaction will have which is enough to uniquely identify it.
//!
//! We build an association between account-nonce and tx hash by backfilling settlement events with
//! the account and nonce of their tx hash. This happens in an always running background task.
//!
//! Alternatively we could change the event insertion code to do this but I (vk) would like to keep
//! that code as fast as possible to not slow down event insertion which also needs to deal with
//! reorgs. It is also nicer from a code organization standpoint.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use primitive_types::H256;
use shared::{
    current_block::CurrentBlockStream, ethrpc::Web3, event_handling::MAX_REORG_BLOCK_COUNT,
};
use web3::types::TransactionId;

use crate::database::Postgres;

pub struct AuctionTransactionUpdater {
    pub web3: Web3,
    pub db: Postgres,
    pub current_block: CurrentBlockStream,
}

impl AuctionTransactionUpdater {
    pub async fn run_forever(self) -> ! {
        loop {
            match self.update().await {
                Ok(true) => (),
                Ok(false) => tokio::time::sleep(Duration::from_secs(10)).await,
                Err(err) => {
                    tracing::error!(?err, "auction transaction update task failed");
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
            }
        }
    }

    /// Update a single settlement event.
    ///
    /// Returns whether an update was performed.
    async fn update(&self) -> Result<bool> {
        let current_block = self
            .current_block
            .borrow()
            .number
            .context("no block number")?
            .as_u64();
        let reorg_safe_block: u64 = current_block
            .checked_sub(MAX_REORG_BLOCK_COUNT)
            .context("no reorg safe block")?;
        let reorg_safe_block: i64 = reorg_safe_block.try_into().context("convert block")?;
        let event = match self
            .db
            .get_settlement_event_without_tx_info(reorg_safe_block)
            .await
            .context("get_settlement_event_without_tx_info")?
        {
            Some(event) => event,
            None => return Ok(false),
        };
        let hash = H256(event.tx_hash.0);
        tracing::trace!(?hash);

        let transaction = self
            .web3
            .eth()
            .transaction(TransactionId::Hash(hash))
            .await
            .with_context(|| format!("get tx {hash:?}"))?
            .with_context(|| format!("no tx {hash:?}"))?;
        let from = transaction
            .from
            .with_context(|| format!("no from {hash:?}"))?;
        let nonce: i64 = transaction
            .nonce
            .try_into()
            .map_err(|err| anyhow!("{}", err))
            .with_context(|| format!("convert nonce {hash:?}"))?;

        self.db
            .update_settlement_tx_info(event.block_number, event.log_index, from, nonce, hash)
            .await
            .context("update_settlement_tx_info")?;

        Ok(true)
    }
}
