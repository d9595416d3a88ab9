use {crate::auction::AuctionId, sqlx::PgConnection};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SettlementCallData {
    pub auction_id: AuctionId,
    pub call_data: Vec<u8>,
    pub uninternalized_call_data: Vec<u8>,
}

pub async fn insert(ex: &mut PgConnection, row: SettlementCallData) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"INSERT INTO settlement_call_data (auction_id, call_data, uninternalized_call_data) VALUES ($1, $2, $3);"#;
    sqlx::query(QUERY)
        .bind(row.auction_id)
        .bind(row.call_data.as_slice())
        .bind(row.uninternalized_call_data.as_slice())
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn fetch(
    ex: &mut PgConnection,
    auction_id: AuctionId,
) -> Result<Option<SettlementCallData>, sqlx::Error> {
    const QUERY: &str = r#"SELECT * FROM settlement_call_data WHERE auction_id = $1"#;
    sqlx::query_as(QUERY)
        .bind(auction_id)
        .fetch_optional(ex)
        .await
}
