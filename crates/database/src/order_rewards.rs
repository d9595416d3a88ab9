use crate::{auction::AuctionId, OrderUid};
use sqlx::PgConnection;

pub async fn save(
    ex: &mut PgConnection,
    order: OrderUid,
    auction: AuctionId,
    reward: f64,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO order_rewards (order_uid, auction_id, reward)
VALUES ($1, $2, $3)
    ;"#;
    sqlx::query(QUERY)
        .bind(order)
        .bind(auction)
        .bind(reward)
        .execute(ex)
        .await?;
    Ok(())
}
