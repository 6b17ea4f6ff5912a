//! # Booking Handlers
//!
//! This module contains handlers for the whole booking lifecycle: placing
//! a reservation request, reviewing it, cancelling it, and exporting the
//! full history. It is where slot arbitration happens.
//!
//! ## Slot Arbitration
//!
//! A slot is the triple (hall, date, period), and at most one live
//! booking may hold it. Arbitration is delegated to Postgres rather than
//! done with a read-then-write sequence:
//!
//! 1. A partial unique index covers (hall_id, booking_date, period) for
//!    rows whose status is live (pending, accepted or booked)
//! 2. Inserts go through `ON CONFLICT ... DO NOTHING RETURNING`, so a
//!    losing insert comes back empty instead of raising
//! 3. An empty result is reported to the caller as a 409
//!
//! Two requests racing for the same slot therefore serialize inside the
//! database; exactly one of them wins no matter how the API processes
//! are scheduled. Status changes use the same shape: guarded updates
//! that return nothing when another request got there first.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use campusbook_core::{
    errors::BookingError,
    lifecycle::{self, CancelOutcome},
    models::{
        booking::{
            Booking, BookingExportRow, CreateBookingRequest, UpdateBookingStatusRequest,
        },
        event::{CancelledBooking, ChangeEvent},
        user::UserRole,
    },
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{
        auth::{AdminUser, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

/// Query parameters for the booking list endpoint
///
/// # Fields
///
/// * `hall_id` - Restrict the list to one hall's bookings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    /// Optional hall to filter by
    pub hall_id: Option<Uuid>,
}

/// Lists bookings, newest first
///
/// Admins see every booking and may narrow the list with the `hallId`
/// query parameter. Faculty callers are always restricted to their own
/// bookings, whatever filters they pass.
#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    auth_user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user_filter = match auth_user.0.role {
        UserRole::Admin => None,
        UserRole::Faculty => Some(auth_user.0.id),
    };

    let db_bookings = campusbook_db::repositories::bookings::list_bookings(
        &state.db_pool,
        query.hall_id,
        user_filter,
    )
    .await
    .map_err(BookingError::Database)?;

    let bookings = db_bookings
        .into_iter()
        .map(Booking::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(bookings))
}

/// Places a reservation request for one slot
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings
/// { "hallId": "...", "bookingReason": "...", "bookingDate": "2025-03-10", "period": 3 }
/// ```
///
/// # Algorithm
///
/// 1. Validation:
///    - All four fields must be present and well formed
///    - The date must parse as `YYYY-MM-DD`
///    - The period must be one of the eight slots in the timetable
///
/// 2. Arbitration:
///    - The row is inserted with status `pending` through the conflict
///      clause described in the module docs
///    - No winner means some live booking already holds the slot, and
///      the caller gets a 409
///
/// 3. Announcement:
///    - The stored booking is published as a `booking:created` event
///    - The caller's display name is snapshotted into the row, so the
///      booking stays identifiable if the account is later deleted
///
/// # Errors
///
/// * `BookingError::Validation` - Missing or malformed fields
/// * `BookingError::Conflict` - The slot is already booked or pending
/// * `BookingError::Database` - Database error
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    auth_user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let new_booking = lifecycle::validate_new_booking(&payload)?;

    // The hall id is not resolved against the catalog; an id that points
    // nowhere still claims its slot
    let faculty_name = auth_user.0.display_name().to_string();

    let db_booking = campusbook_db::repositories::bookings::create_booking(
        &state.db_pool,
        new_booking.hall_id,
        auth_user.0.id,
        &faculty_name,
        &new_booking.booking_reason,
        new_booking.booking_date,
        new_booking.period,
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| {
        BookingError::Conflict("This slot is already booked or pending".to_string())
    })?;

    let booking = Booking::try_from(db_booking)?;
    state
        .notifier
        .publish(ChangeEvent::BookingCreated(booking.clone()));

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Reviews a pending booking (admin only)
///
/// Accepts, books, or rejects a pending request. Rejection requires a
/// reason; acceptance clears any stale one. The update is guarded on the
/// status the review was planned against, so two concurrent reviews
/// cannot both apply.
#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let db_booking = campusbook_db::repositories::bookings::get_booking_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;
    let current = Booking::try_from(db_booking)?;

    let update = lifecycle::plan_status_update(
        current.status,
        &payload.status,
        payload.rejection_reason.as_deref(),
    )?;

    let db_booking = campusbook_db::repositories::bookings::update_booking_status(
        &state.db_pool,
        id,
        current.status,
        update.status,
        update.rejection_reason.as_deref(),
    )
    .await
    .map_err(BookingError::Database)?
    // The guard loses only when the status moved between the read above
    // and this update
    .ok_or_else(|| {
        BookingError::Validation("Only pending bookings can be updated".to_string())
    })?;

    let booking = Booking::try_from(db_booking)?;
    state
        .notifier
        .publish(ChangeEvent::BookingUpdated(booking.clone()));

    Ok(Json(booking))
}

/// Cancels a booking
///
/// Owners may cancel their own bookings, admins anyone's. Cancelling an
/// already-cancelled booking succeeds without doing anything; cancelling
/// a rejected one is refused.
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let db_booking = campusbook_db::repositories::bookings::get_booking_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;
    let booking = Booking::try_from(db_booking)?;

    lifecycle::can_cancel(auth_user.0.id, auth_user.0.role, booking.user_id)?;

    match lifecycle::plan_cancel(booking.status)? {
        CancelOutcome::AlreadyCancelled => {}
        CancelOutcome::Cancelled => {
            let cancelled =
                campusbook_db::repositories::bookings::cancel_booking(&state.db_pool, id)
                    .await
                    .map_err(BookingError::Database)?;

            // An empty result means another request settled the booking
            // first; the slot is free either way, so stay quiet
            if cancelled.is_some() {
                state
                    .notifier
                    .publish(ChangeEvent::BookingCancelled(CancelledBooking { id }));
            }
        }
    }

    Ok(Json(json!({ "message": "Booking cancelled" })))
}

/// Exports the full booking history (admin only)
///
/// Rows are flattened for reporting: hall names are joined in (falling
/// back to the raw id for deleted halls) and periods carry their
/// timetable labels.
#[axum::debug_handler]
pub async fn export_bookings(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<BookingExportRow>>, AppError> {
    let db_rows = campusbook_db::repositories::bookings::list_export_rows(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    let rows = db_rows
        .into_iter()
        .map(BookingExportRow::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(rows))
}
