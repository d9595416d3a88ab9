use {
    crate::{Address, auction::AuctionId},
    chrono::{DateTime, Utc},
    sqlx::PgConnection,
    tracing::instrument,
};

#[instrument(skip_all)]
pub async fn insert(
    ex: &mut PgConnection,
    auction_id: AuctionId,
    solver: Address,
    solution_uid: i64,
    start_timestamp: DateTime<Utc>,
    start_block: i64,
    deadline_block: i64,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO settlement_executions (auction_id, solver, solution_uid, start_timestamp, start_block, deadline_block)
VALUES ($1, $2, $3, $4, $5, $6)
    ;"#;

    sqlx::query(QUERY)
        .bind(auction_id)
        .bind(solver)
        .bind(solution_uid)
        .bind(start_timestamp)
        .bind(start_block)
        .bind(deadline_block)
        .execute(ex)
        .await?;

    Ok(())
}

#[instrument(skip_all)]
pub async fn update(
    ex: &mut PgConnection,
    auction_id: AuctionId,
    solver: Address,
    solution_uid: i64,
    end_timestamp: DateTime<Utc>,
    end_block: i64,
    outcome: String,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
UPDATE settlement_executions
SET end_timestamp = $4, end_block = $5, outcome = $6
WHERE auction_id = $1 AND solver = $2 AND solution_uid = $3
    ;"#;

    sqlx::query(QUERY)
        .bind(auction_id)
        .bind(solver)
        .bind(solution_uid)
        .bind(end_timestamp)
        .bind(end_block)
        .bind(outcome)
        .execute(ex)
        .await?;

    Ok(())
}
