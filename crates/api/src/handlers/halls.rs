//! # Hall Handlers
//!
//! Hall catalog management. Anyone signed in can browse the catalog;
//! creating and deleting halls is admin-only. New halls are announced to
//! event observers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use campusbook_core::{
    errors::BookingError,
    models::{
        event::ChangeEvent,
        hall::{CreateHallRequest, Hall},
    },
};
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

#[axum::debug_handler]
pub async fn list_halls(
    State(state): State<Arc<ApiState>>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Hall>>, AppError> {
    let db_halls = campusbook_db::repositories::halls::list_halls(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(db_halls.into_iter().map(Hall::from).collect()))
}

#[axum::debug_handler]
pub async fn create_hall(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateHallRequest>,
) -> Result<(StatusCode, Json<Hall>), AppError> {
    if payload.name.trim().is_empty() || payload.capacity.trim().is_empty() {
        return Err(AppError(BookingError::Validation(
            "name and capacity are required".to_string(),
        )));
    }

    let db_hall = campusbook_db::repositories::halls::create_hall(
        &state.db_pool,
        payload.name.trim(),
        payload.capacity.trim(),
        payload.location.as_deref(),
        payload.amenities.as_deref(),
    )
    .await
    .map_err(BookingError::Database)?;

    let hall = Hall::from(db_hall);
    state.notifier.publish(ChangeEvent::HallCreated(hall.clone()));

    Ok((StatusCode::CREATED, Json(hall)))
}

/// Removes a hall. Bookings that point at it are left behind untouched;
/// exports fall back to the raw hall id for those rows.
#[axum::debug_handler]
pub async fn delete_hall(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    campusbook_db::repositories::halls::delete_hall(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(json!({ "message": "Hall deleted" })))
}
