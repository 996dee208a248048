use sqlx::PgPool;

use crate::{error::Result, models::Session};

pub async fn create_session(pool: &PgPool, token: &str, user_id: i32) -> Result<Session> {
    let session = sqlx::query_as::<_, Session>(
        "INSERT INTO sessions (token, user_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(token)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    Ok(session)
}

pub async fn delete_session(pool: &PgPool, token: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
