use crate::models::{DbBooking, DbExportRow};
use crate::schema::status_list_sql;
use campusbook_core::models::booking::BookingStatus;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, hall_id, user_id, faculty_name, booking_reason, \
     booking_date, period, status, rejection_reason, created_at, updated_at";

/// Inserts a pending booking unless a live booking already holds the
/// slot, in which case nothing is written and `None` comes back. The
/// conflict target is the partial unique index from the schema, so two
/// concurrent requests for one slot commit at most one row.
pub async fn create_booking(
    pool: &Pool<Postgres>,
    hall_id: Uuid,
    user_id: Uuid,
    faculty_name: &str,
    booking_reason: &str,
    booking_date: NaiveDate,
    period: i16,
) -> Result<Option<DbBooking>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating booking: id={}, hall_id={}, date={}, period={}",
        id,
        hall_id,
        booking_date,
        period
    );

    let live_statuses = status_list_sql(&BookingStatus::LIVE);
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO bookings
            (id, hall_id, user_id, faculty_name, booking_reason, booking_date, period, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (hall_id, booking_date, period) WHERE status IN ({live_statuses}) DO NOTHING
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(hall_id)
    .bind(user_id)
    .bind(faculty_name)
    .bind(booking_reason)
    .bind(booking_date)
    .bind(period)
    .bind(BookingStatus::Pending.as_str())
    .bind(now)
    .fetch_optional(pool)
    .await?;

    if booking.is_none() {
        tracing::debug!(
            "Slot already held: hall_id={}, date={}, period={}",
            hall_id,
            booking_date,
            period
        );
    }

    Ok(booking)
}

pub async fn get_booking_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    tracing::debug!("Getting booking by id: {}", id);

    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Newest first. Either filter may be absent; non-admin callers pass
/// their own id as `user_id`.
pub async fn list_bookings(
    pool: &Pool<Postgres>,
    hall_id: Option<Uuid>,
    user_id: Option<Uuid>,
) -> Result<Vec<DbBooking>> {
    tracing::debug!("Listing bookings: hall_id={:?}, user_id={:?}", hall_id, user_id);

    let bookings = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE ($1::uuid IS NULL OR hall_id = $1)
          AND ($2::uuid IS NULL OR user_id = $2)
        ORDER BY created_at DESC
        "#,
    ))
    .bind(hall_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Applies an admin decision. The update is guarded on the status the
/// caller planned against; `None` means the booking is unknown or its
/// status moved underneath the caller.
pub async fn update_booking_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    current: BookingStatus,
    status: BookingStatus,
    rejection_reason: Option<&str>,
) -> Result<Option<DbBooking>> {
    let now = Utc::now();

    tracing::debug!("Updating booking status: id={}, status={}", id, status);

    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE bookings
        SET status = $3, rejection_reason = $4, updated_at = $5
        WHERE id = $1 AND status = $2
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(current.as_str())
    .bind(status.as_str())
    .bind(rejection_reason)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Cancels a live booking. `None` means it was not live any more by the
/// time the update ran.
pub async fn cancel_booking(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    let now = Utc::now();

    tracing::debug!("Cancelling booking: id={}", id);

    let live_statuses = status_list_sql(&BookingStatus::LIVE);
    let booking = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE bookings
        SET status = $2, updated_at = $3
        WHERE id = $1 AND status IN ({live_statuses})
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(BookingStatus::Cancelled.as_str())
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Every booking joined with its hall's name, newest first. Orphaned
/// bookings fall back to the raw hall id.
pub async fn list_export_rows(pool: &Pool<Postgres>) -> Result<Vec<DbExportRow>> {
    tracing::debug!("Listing export rows");

    let rows = sqlx::query_as::<_, DbExportRow>(
        r#"
        SELECT COALESCE(h.name, b.hall_id::text) AS hall_name,
               b.faculty_name, b.booking_reason, b.booking_date,
               b.period, b.status, b.rejection_reason, b.created_at
        FROM bookings b
        LEFT JOIN halls h ON h.id = b.hall_id
        ORDER BY b.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
