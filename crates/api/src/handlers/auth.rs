//! # Auth Handlers
//!
//! Registration, login, logout and the current-user lookup. Logins mint
//! an opaque bearer token persisted in the sessions table; the token is
//! what every protected endpoint expects in the `Authorization` header.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use campusbook_core::{
    errors::BookingError,
    models::user::{CreateUserRequest, LoginRequest, LoginResponse, User, UserRole},
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

/// Validates and persists a new account. Shared by public registration
/// and the admin user endpoint, which differ only in their wrapping.
pub(crate) async fn create_account(
    state: &ApiState,
    payload: &CreateUserRequest,
    missing_message: &str,
) -> Result<User, AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError(BookingError::Validation(
            missing_message.to_string(),
        )));
    }

    // Absent or blank role falls back to faculty
    let role = match payload.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => role.parse::<UserRole>()?,
        None => UserRole::Faculty,
    };

    let password_hash = auth::hash_password(&payload.password).map_err(BookingError::Database)?;

    let db_user = campusbook_db::repositories::users::create_user(
        &state.db_pool,
        payload.username.trim(),
        &password_hash,
        role.as_str(),
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.department.as_deref(),
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| BookingError::Conflict("Username already taken".to_string()))?;

    let user = User::try_from(db_user)?;
    Ok(user)
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = create_account(&state, &payload, "Username and password required").await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "user": user })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // Unknown usernames and wrong passwords answer identically
    let db_user = campusbook_db::repositories::users::get_user_by_username(
        &state.db_pool,
        &payload.username,
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| BookingError::Authentication("Invalid credentials".to_string()))?;

    let valid = auth::verify_password(&payload.password, &db_user.password_hash)
        .map_err(BookingError::Database)?;
    if !valid {
        return Err(AppError(BookingError::Authentication(
            "Invalid credentials".to_string(),
        )));
    }

    let token = auth::generate_session_token();
    let expires_at = Utc::now() + Duration::hours(state.session_ttl_hours as i64);
    campusbook_db::repositories::sessions::create_session(
        &state.db_pool,
        &token,
        db_user.id,
        expires_at,
    )
    .await
    .map_err(BookingError::Database)?;

    let user = User::try_from(db_user)?;

    Ok(Json(LoginResponse { token, user }))
}

/// Drops the presented session, if any. Logging out twice is fine.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    if let Some(token) = auth::bearer_token(&headers) {
        campusbook_db::repositories::sessions::delete_session(&state.db_pool, token)
            .await
            .map_err(BookingError::Database)?;
    }

    Ok(Json(json!({ "message": "Logged out" })))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn me(auth_user: auth::AuthUser) -> Json<Value> {
    Json(json!({ "user": auth_user.0 }))
}
