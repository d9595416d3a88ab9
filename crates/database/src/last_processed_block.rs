use sqlx::{Executor, PgConnection};

pub async fn insert_or_update_last_block(
    ex: &mut PgConnection,
    index: &str,
    last_processed_block: i64,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO last_processed_blocks (index, last_block)
VALUES ($1, $2)
ON CONFLICT (index)
DO UPDATE SET last_block = EXCLUDED.last_block;
    "#;

    ex.execute(sqlx::query(QUERY).bind(index).bind(last_processed_block))
        .await?;
    Ok(())
}

pub async fn last_block(ex: &mut PgConnection, index: &str) -> Result<Option<i64>, sqlx::Error> {
    const QUERY: &str = r#"
SELECT block_number
FROM last_processed_blocks
WHERE index = $1;
    "#;

    sqlx::query_scalar(QUERY)
        .bind(index)
        .fetch_optional(ex)
        .await
}
