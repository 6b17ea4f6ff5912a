use crate::models::{DbSession, DbUser};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_session(
    pool: &Pool<Postgres>,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<DbSession> {
    let now = Utc::now();

    tracing::debug!("Creating session: user_id={}, expires_at={}", user_id, expires_at);

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (token, user_id, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING token, user_id, created_at, expires_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Resolves a bearer token to its user in one query. Expired sessions
/// are invisible here; the sweeper removes them later.
pub async fn find_session_user(pool: &Pool<Postgres>, token: &str) -> Result<Option<DbUser>> {
    tracing::debug!("Looking up session user");

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT u.id, u.username, u.password_hash, u.role, u.name, u.email, u.department, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Deleting an unknown or already-removed token is a no-op.
pub async fn delete_session(pool: &Pool<Postgres>, token: &str) -> Result<()> {
    tracing::debug!("Deleting session");

    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_expired_sessions(pool: &Pool<Postgres>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE expires_at <= NOW()
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
