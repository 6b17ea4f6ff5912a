//! # Authentication Module
//!
//! This module provides authentication for the CampusBook API: Argon2
//! password hashing, opaque bearer-token sessions backed by the sessions
//! table, and the extractors handlers use to require a logged-in user or
//! an admin.
//!
//! The implementation uses Argon2, a secure password hashing algorithm,
//! to protect user passwords from common attacks like rainbow tables
//! and brute force attempts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use campusbook_core::errors::BookingError;
use campusbook_core::models::user::{User, UserRole};
use eyre::Result;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

/// Length of generated session tokens. Fits the sessions.token column.
const SESSION_TOKEN_LENGTH: usize = 48;

/// Hashes a password using the Argon2 algorithm
///
/// This function securely hashes passwords before storage in the database,
/// automatically generating a random salt and using industry-standard
/// parameters for Argon2.
///
/// # Security Notes
///
/// - Uses a random salt for each password
/// - Uses default Argon2 parameters (memory: 19MiB, iterations: 3, parallelism: 4)
/// - Returns password in PHC string format (includes algorithm, version, parameters, salt, and hash)
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a plain text password against a stored PHC-format hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;

    let is_valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    Ok(is_valid)
}

/// Generates an opaque session token for a fresh login.
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Pulls the bearer token out of the `Authorization` header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header against the session store. Absent, unknown, or expired tokens
/// are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| BookingError::Authentication("Unauthorized".to_string()))?;

        let db_user =
            campusbook_db::repositories::sessions::find_session_user(&state.db_pool, token)
                .await
                .map_err(BookingError::Database)?
                .ok_or_else(|| BookingError::Authentication("Unauthorized".to_string()))?;

        let user = User::try_from(db_user)?;

        Ok(AuthUser(user))
    }
}

/// An authenticated caller with the admin role. Everyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            return Err(AppError(BookingError::Authorization(
                "Forbidden: Admin only".to_string(),
            )));
        }

        Ok(AdminUser(user))
    }
}

/// Makes sure an administrator account exists, creating one with the
/// configured credentials when the users table has no admin yet.
pub async fn seed_admin(db_pool: &sqlx::PgPool, username: &str, password: &str) -> Result<()> {
    let admins = campusbook_db::repositories::users::count_admins(db_pool).await?;
    if admins > 0 {
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    let created = campusbook_db::repositories::users::create_user(
        db_pool,
        username,
        &password_hash,
        UserRole::Admin.as_str(),
        Some("Administrator"),
        None,
        None,
    )
    .await?;

    match created {
        Some(user) => {
            tracing::info!("Seeded admin account {}", user.username);
            if password == "admin123" {
                tracing::warn!(
                    "Admin account uses the default password, set ADMIN_PASSWORD to change it"
                );
            }
        }
        // The username is held by a non-admin account; leave it alone
        None => tracing::warn!(
            "Username {} already exists, admin account not seeded",
            username
        ),
    }

    Ok(())
}

/// Spawns the background task that purges expired session rows. Expired
/// sessions are already invisible to lookups; this keeps the table from
/// growing without bound.
pub fn spawn_session_sweeper(db_pool: sqlx::PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            match campusbook_db::repositories::sessions::delete_expired_sessions(&db_pool).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Removed {} expired sessions", removed),
                Err(error) => tracing::warn!("Session sweep failed: {}", error),
            }
        }
    });
}
