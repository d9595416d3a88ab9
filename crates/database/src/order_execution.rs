use crate::{auction::AuctionId, OrderUid};
use bigdecimal::BigDecimal;
use sqlx::PgConnection;

pub async fn save(
    ex: &mut PgConnection,
    order: &OrderUid,
    auction: AuctionId,
    reward: f64,
    surplus_fee: Option<&BigDecimal>,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO order_execution (order_uid, auction_id, reward, surplus_fee)
VALUES ($1, $2, $3, $4)
    ;"#;
    sqlx::query(QUERY)
        .bind(order)
        .bind(auction)
        .bind(reward)
        .bind(surplus_fee)
        .execute(ex)
        .await?;
    Ok(())
}
