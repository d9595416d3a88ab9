use crate::{OrderUid, PgTransaction, TransactionHash};
use sqlx::{Executor, PgConnection};

#[derive(Clone, Debug, Default, sqlx::FromRow, Eq, PartialEq)]
pub struct EthOrderPlacement {
    pub uid: OrderUid,
    pub valid_to: i64,
}

pub async fn insert_or_overwrite_orders(
    ex: &mut PgTransaction<'_>,
    events: &[EthOrderPlacement],
) -> Result<(), sqlx::Error> {
    for event in events {
        insert_or_overwrite_ethflow_order(ex, event).await?;
    }
    Ok(())
}

pub async fn insert_or_overwrite_ethflow_order(
    ex: &mut PgConnection,
    event: &EthOrderPlacement,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = "\
        INSERT INTO ethflow_orders (uid, valid_to) VALUES ($1, $2) \
        ON CONFLICT (uid) DO UPDATE SET valid_to = $2;";
    sqlx::query(QUERY)
        .bind(event.uid)
        .bind(event.valid_to)
        .execute(ex)
        .await?;
    Ok(())
}

#[derive(Clone, Debug, Default, sqlx::FromRow, Eq, PartialEq)]
pub struct EthOrderData {
    pub uid: OrderUid,
    pub valid_to: i64,
    pub refund_tx: Option<TransactionHash>,
}

pub async fn read_order(
    ex: &mut PgConnection,
    id: &OrderUid,
) -> Result<Option<EthOrderData>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT uid, valid_to, ethflow_refunds.tx_hash as refund_tx FROM ethflow_orders
        LEFT JOIN ethflow_refunds ON ethflow_orders.uid = ethflow_refunds.order_uid
        WHERE uid = $1
    "#;
    sqlx::query_as(QUERY).bind(id).fetch_optional(ex).await
}

#[derive(Debug, Clone, Default)]
pub struct Refund {
    pub order_uid: OrderUid,
    pub tx_hash: TransactionHash,
    pub block_number: u64,
}

/// Used to delete refunds in case of a reorg.
pub async fn delete_refunds(
    ex: &mut PgTransaction<'_>,
    from_block: i64,
    to_block: i64,
) -> Result<(), sqlx::Error> {
    const DELETE_REFUNDS: &str = "\
    DELETE FROM ethflow_refunds \
    WHERE block_number >= $1 and block_number <= $2;";
    ex.execute(sqlx::query(DELETE_REFUNDS).bind(from_block).bind(to_block))
        .await?;
    Ok(())
}

/// Returns the last block where an ethflow refund transaction has been indexed.
pub async fn last_indexed_block(ex: &mut PgConnection) -> Result<Option<i64>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT block_number from ethflow_refunds ORDER BY block_number DESC LIMIT 1;
    "#;
    sqlx::query_scalar(QUERY).fetch_optional(ex).await
}

pub async fn insert_refund_tx_hashes(
    ex: &mut PgTransaction<'_>,
    refunds: &[Refund],
) -> Result<(), sqlx::Error> {
    for refund in refunds.iter() {
        insert_refund_tx_hash(ex, refund).await?;
    }
    Ok(())
}

pub async fn insert_refund_tx_hash(
    ex: &mut PgTransaction<'_>,
    refund: &Refund,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
        INSERT INTO ethflow_refunds (order_uid, block_number, tx_hash) VALUES($1, $2, $3) 
        ON CONFLICT (order_uid) DO UPDATE SET block_number = $2, tx_hash = $3
    "#;

    ex.execute(
        sqlx::query(QUERY)
            .bind(refund.order_uid)
            .bind(refund.block_number as i64)
            .bind(refund.tx_hash),
    )
    .await?;
    Ok(())
}

pub async fn refundable_orders(
    ex: &mut PgConnection,
    since_valid_to: i64,
    min_validity_duration: i64,
    min_slippage: f64,
) -> Result<Vec<EthOrderPlacement>, sqlx::Error> {
    const QUERY: &str = r#"
SELECT eo.uid, eo.valid_to from orders o
INNER JOIN ethflow_orders eo on eo.uid = o.uid 
INNER JOIN order_quotes oq on o.uid = oq.order_uid
LEFT JOIN trades t on o.uid = t.order_uid
LEFT JOIN onchain_order_invalidations o_inv on o.uid = o_inv.uid
LEFT JOIN ethflow_refunds o_ref on o.uid = o_ref.order_uid
WHERE 
o_ref.tx_hash is null
AND o_inv.uid is null
AND o.partially_fillable = false
AND t.order_uid is null
AND eo.valid_to < $1
AND o.sell_amount = oq.sell_amount
AND (1.0 - o.buy_amount / oq.buy_amount) > $3
AND eo.valid_to - extract(epoch from creation_timestamp)::int > $2
    "#;
    sqlx::query_as(QUERY)
        .bind(since_valid_to)
        .bind(min_validity_duration)
        .bind(min_slippage)
        .fetch_all(ex)
        .await
}
