use campusbook_core::models::booking::BookingStatus;
use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Renders a status slice as a SQL IN list, e.g. `'pending', 'accepted'`.
/// The live-slot index and the conditional insert both derive their
/// predicate from [`BookingStatus::LIVE`] through this; the list is not
/// written out anywhere else.
pub(crate) fn status_list_sql(statuses: &[BookingStatus]) -> String {
    statuses
        .iter()
        .map(|status| format!("'{status}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username VARCHAR(255) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'faculty' CHECK (role IN ('admin', 'faculty')),
            name VARCHAR(255) NULL,
            email VARCHAR(255) NULL,
            department VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR(64) PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create halls table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS halls (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            capacity VARCHAR(255) NOT NULL,
            location VARCHAR(255) NULL,
            amenities TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table. hall_id and user_id carry no foreign keys:
    // deleting a hall or a user leaves its bookings behind as orphans.
    let all_statuses = status_list_sql(&BookingStatus::ALL);
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            hall_id UUID NOT NULL,
            user_id UUID NOT NULL,
            faculty_name VARCHAR(255) NULL,
            booking_reason TEXT NOT NULL,
            booking_date DATE NOT NULL,
            period SMALLINT NOT NULL CHECK (period BETWEEN 1 AND 8),
            status VARCHAR(32) NOT NULL DEFAULT 'pending' CHECK (status IN ({all_statuses})),
            rejection_reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    ))
    .execute(pool)
    .await?;

    // One live booking per slot, enforced by the store itself. The
    // conditional insert in the bookings repository targets this index.
    let live_statuses = status_list_sql(&BookingStatus::LIVE);
    sqlx::query(&format!(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_live_slot
        ON bookings (hall_id, booking_date, period)
        WHERE status IN ({live_statuses});
        "#,
    ))
    .execute(pool)
    .await?;

    // Create indexes, one statement per call so each goes through as its
    // own prepared statement
    for index_sql in [
        "CREATE INDEX IF NOT EXISTS idx_bookings_hall_id ON bookings(hall_id)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)",
    ] {
        sqlx::query(index_sql).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
