use crate::models::DbUser;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Inserts a user. Returns `None` when the username is already taken;
/// the unique constraint arbitrates, so concurrent registrations cannot
/// both land.
pub async fn create_user(
    pool: &Pool<Postgres>,
    username: &str,
    password_hash: &str,
    role: &str,
    name: Option<&str>,
    email: Option<&str>,
    department: Option<&str>,
) -> Result<Option<DbUser>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, username={}, role={}", id, username, role);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, username, password_hash, role, name, email, department, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (username) DO NOTHING
        RETURNING id, username, password_hash, role, name, email, department, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .bind(name)
    .bind(email)
    .bind(department)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    if user.is_none() {
        tracing::debug!("Username already taken: {}", username);
    }

    Ok(user)
}

pub async fn get_user_by_username(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Option<DbUser>> {
    tracing::debug!("Getting user by username: {}", username);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, username, password_hash, role, name, email, department, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    tracing::debug!("Getting user by id: {}", id);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, username, password_hash, role, name, email, department, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_users(pool: &Pool<Postgres>) -> Result<Vec<DbUser>> {
    tracing::debug!("Listing users");

    let users = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, username, password_hash, role, name, email, department, created_at
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn count_admins(pool: &Pool<Postgres>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users WHERE role = 'admin'
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Deletes a user and, through the sessions foreign key, every session
/// they hold. Deleting an unknown id is a no-op.
pub async fn delete_user(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    tracing::debug!("Deleting user: id={}", id);

    sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
