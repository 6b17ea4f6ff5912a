use crate::models::DbHall;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_hall(
    pool: &Pool<Postgres>,
    name: &str,
    capacity: &str,
    location: Option<&str>,
    amenities: Option<&str>,
) -> Result<DbHall> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating hall: id={}, name={}", id, name);

    let hall = sqlx::query_as::<_, DbHall>(
        r#"
        INSERT INTO halls (id, name, capacity, location, amenities, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, capacity, location, amenities, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(capacity)
    .bind(location)
    .bind(amenities)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(hall)
}

pub async fn list_halls(pool: &Pool<Postgres>) -> Result<Vec<DbHall>> {
    tracing::debug!("Listing halls");

    let halls = sqlx::query_as::<_, DbHall>(
        r#"
        SELECT id, name, capacity, location, amenities, created_at
        FROM halls
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(halls)
}

/// Unconditional delete. Bookings that reference the hall stay behind
/// and show the raw hall id wherever a name would have been.
pub async fn delete_hall(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    tracing::debug!("Deleting hall: id={}", id);

    sqlx::query(
        r#"
        DELETE FROM halls
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
