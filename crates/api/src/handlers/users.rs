//! # User Handlers
//!
//! Admin-only account management: list, create and delete users.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use campusbook_core::{
    errors::BookingError,
    models::user::{CreateUserRequest, User},
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    handlers::auth::create_account,
    middleware::{auth::AdminUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, AppError> {
    let db_users = campusbook_db::repositories::users::list_users(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    let users = db_users
        .into_iter()
        .map(User::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(users))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = create_account(&state, &payload, "username and password required").await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Deletes an account. Sessions go with it; bookings survive under the
/// snapshotted faculty name.
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    campusbook_db::repositories::users::delete_user(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(json!({ "message": "User deleted" })))
}
