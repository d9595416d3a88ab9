//! This file contains all functions related to reading or updating
//! data about the competition during an auction in the old JSON based
//! table.
//! See `solver_competition_v2.rs` for the new version of this which
//! uses individual and well defined tables for this.

use {
    crate::{TransactionHash, auction::AuctionId},
    sqlx::{PgConnection, types::JsonValue},
    tracing::instrument,
};

#[instrument(skip_all)]
pub async fn save(
    ex: &mut PgConnection,
    id: AuctionId,
    data: &JsonValue,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO solver_competitions (id, json)
VALUES ($1, $2)
    ;"#;
    sqlx::query(QUERY).bind(id).bind(data).execute(ex).await?;
    Ok(())
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LoadCompetition {
    pub json: JsonValue,
    pub id: AuctionId,
    // Multiple settlements can be associated with a single competition.
    pub tx_hashes: Vec<TransactionHash>,
}

#[instrument(skip_all)]
pub async fn load_by_id(
    ex: &mut PgConnection,
    id: AuctionId,
) -> Result<Option<LoadCompetition>, sqlx::Error> {
    const QUERY: &str = r#"
SELECT sc.json, sc.id, COALESCE(ARRAY_AGG(s.tx_hash) FILTER (WHERE so.block_number IS NOT NULL), '{}') AS tx_hashes
FROM solver_competitions sc
-- outer joins because the data might not have been indexed yet
LEFT OUTER JOIN settlements s ON sc.id = s.auction_id
-- exclude settlements from another environment for which observation is guaranteed to not exist
LEFT OUTER JOIN settlement_observations so 
    ON s.block_number = so.block_number 
    AND s.log_index = so.log_index
WHERE sc.id = $1
GROUP BY sc.id
    ;"#;
    sqlx::query_as(QUERY).bind(id).fetch_optional(ex).await
}

#[instrument(skip_all)]
pub async fn load_latest_competitions(
    ex: &mut PgConnection,
    latest_competitions_count: u32,
) -> Result<Vec<LoadCompetition>, sqlx::Error> {
    const QUERY: &str = r#"
SELECT sc.json, sc.id, COALESCE(ARRAY_AGG(s.tx_hash) FILTER (WHERE so.block_number IS NOT NULL), '{}') AS tx_hashes
FROM solver_competitions sc
-- outer joins because the data might not have been indexed yet
LEFT OUTER JOIN settlements s ON sc.id = s.auction_id
-- exclude settlements from another environment for which observation is guaranteed to not exist
LEFT OUTER JOIN settlement_observations so 
    ON s.block_number = so.block_number 
    AND s.log_index = so.log_index
GROUP BY sc.id
ORDER BY sc.id DESC
LIMIT $1
    ;"#;
    sqlx::query_as(QUERY)
        .bind(i64::from(latest_competitions_count))
        .fetch_all(ex)
        .await
}

pub async fn load_latest_competition(
    ex: &mut PgConnection,
) -> Result<Option<LoadCompetition>, sqlx::Error> {
    let competitions = load_latest_competitions(ex, 1).await?;
    let latest = competitions.into_iter().next();
    Ok(latest)
}

#[instrument(skip_all)]
pub async fn load_by_tx_hash(
    ex: &mut PgConnection,
    tx_hash: &TransactionHash,
) -> Result<Option<LoadCompetition>, sqlx::Error> {
    const QUERY: &str = r#"
WITH competition AS (
    SELECT sc.id
    FROM solver_competitions sc
    JOIN settlements s ON sc.id = s.auction_id
    JOIN settlement_observations so 
        ON s.block_number = so.block_number 
        AND s.log_index = so.log_index
    WHERE s.tx_hash = $1
)
SELECT sc.json, sc.id, COALESCE(ARRAY_AGG(s.tx_hash) FILTER (WHERE so.block_number IS NOT NULL), '{}') AS tx_hashes
FROM solver_competitions sc
JOIN settlements s ON sc.id = s.auction_id
JOIN settlement_observations so 
    ON s.block_number = so.block_number 
    AND s.log_index = so.log_index
WHERE sc.id = (SELECT id FROM competition)
GROUP BY sc.id
    ;"#;
    sqlx::query_as(QUERY).bind(tx_hash).fetch_optional(ex).await
}
