use campusbook_api::middleware::{auth, error_handling::AppError};
use campusbook_core::{
    errors::BookingError,
    models::user::{CreateUserRequest, LoginResponse, User, UserRole},
};
use campusbook_db::models::{DbSession, DbUser};
use chrono::{Duration, Utc};
use mockall::predicate;
use uuid::Uuid;

use crate::test_utils::TestContext;

// Mirrors the account creation flow with the repository mocked out
async fn register_flow(
    ctx: &mut TestContext,
    payload: CreateUserRequest,
    missing_message: &'static str,
) -> Result<User, AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError(BookingError::Validation(
            missing_message.to_string(),
        )));
    }

    let role = match payload.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => role.parse::<UserRole>()?,
        None => UserRole::Faculty,
    };

    let password_hash = auth::hash_password(&payload.password).map_err(BookingError::Database)?;

    // Static references for mockall
    let username: &'static str = Box::leak(payload.username.trim().to_string().into_boxed_str());
    let password_hash: &'static str = Box::leak(password_hash.into_boxed_str());
    let name: Option<&'static str> = payload
        .name
        .map(|name| &*Box::leak(name.into_boxed_str()));

    let db_user = ctx
        .user_repo
        .create_user(username, password_hash, role.as_str(), name, None, None)
        .await?
        .ok_or_else(|| BookingError::Conflict("Username already taken".to_string()))?;

    Ok(User::try_from(db_user)?)
}

// Mirrors the login flow with the repositories mocked out
async fn login_flow(
    ctx: &mut TestContext,
    username: &'static str,
    password: &str,
) -> Result<LoginResponse, AppError> {
    let db_user = ctx
        .user_repo
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| BookingError::Authentication("Invalid credentials".to_string()))?;

    let valid = auth::verify_password(password, &db_user.password_hash)
        .map_err(BookingError::Database)?;
    if !valid {
        return Err(AppError(BookingError::Authentication(
            "Invalid credentials".to_string(),
        )));
    }

    let token = auth::generate_session_token();
    let token_static: &'static str = Box::leak(token.clone().into_boxed_str());
    let expires_at = Utc::now() + Duration::hours(24);
    ctx.session_repo
        .create_session(token_static, db_user.id, expires_at)
        .await?;

    let user = User::try_from(db_user)?;

    Ok(LoginResponse { token, user })
}

fn request(username: &str, password: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        password: password.to_string(),
        role: None,
        name: None,
        email: None,
        department: None,
    }
}

#[tokio::test]
async fn test_register_success() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    ctx.user_repo
        .expect_create_user()
        .with(
            predicate::eq("drfoster"),
            predicate::always(),
            predicate::eq("faculty"),
            predicate::eq(Some("Dr. Foster")),
            predicate::always(),
            predicate::always(),
        )
        .times(1)
        .returning(move |username, hash, role, name, _, _| {
            Ok(Some(DbUser {
                id: user_id,
                username: username.to_string(),
                password_hash: hash.to_string(),
                role: role.to_string(),
                name: name.map(str::to_string),
                email: None,
                department: None,
                created_at: now,
            }))
        });

    let mut payload = request("drfoster", "secret");
    payload.name = Some("Dr. Foster".to_string());

    let user = register_flow(&mut ctx, payload, "Username and password required")
        .await
        .expect("Registration should succeed");

    assert_eq!(user.id, user_id);
    assert_eq!(user.username, "drfoster");
    assert_eq!(user.role, UserRole::Faculty);
    assert_eq!(user.display_name(), "Dr. Foster");
}

#[tokio::test]
async fn test_register_blank_role_defaults_to_faculty() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    ctx.user_repo
        .expect_create_user()
        .with(
            predicate::always(),
            predicate::always(),
            predicate::eq("faculty"),
            predicate::always(),
            predicate::always(),
            predicate::always(),
        )
        .returning(move |username, hash, role, _, _, _| {
            Ok(Some(DbUser {
                id: user_id,
                username: username.to_string(),
                password_hash: hash.to_string(),
                role: role.to_string(),
                name: None,
                email: None,
                department: None,
                created_at: now,
            }))
        });

    let mut payload = request("drfoster", "secret");
    payload.role = Some("   ".to_string());

    let user = register_flow(&mut ctx, payload, "Username and password required")
        .await
        .expect("Registration should succeed");

    assert_eq!(user.role, UserRole::Faculty);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let mut ctx = TestContext::new();

    // The insert loses the unique-constraint race and returns nothing
    ctx.user_repo
        .expect_create_user()
        .returning(|_, _, _, _, _, _| Ok(None));

    let result = register_flow(
        &mut ctx,
        request("drfoster", "secret"),
        "Username and password required",
    )
    .await;

    match result.unwrap_err().0 {
        BookingError::Conflict(message) => assert_eq!(message, "Username already taken"),
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_register_missing_password() {
    let mut ctx = TestContext::new();

    ctx.user_repo.expect_create_user().times(0);

    let result = register_flow(
        &mut ctx,
        request("drfoster", ""),
        "Username and password required",
    )
    .await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert_eq!(message, "Username and password required")
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_register_unknown_role() {
    let mut ctx = TestContext::new();

    ctx.user_repo.expect_create_user().times(0);

    let mut payload = request("drfoster", "secret");
    payload.role = Some("staff".to_string());

    let result = register_flow(&mut ctx, payload, "Username and password required").await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => assert_eq!(message, "Unknown role: staff"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_login_unknown_username() {
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_get_user_by_username()
        .with(predicate::eq("nobody"))
        .returning(|_| Ok(None));

    let result = login_flow(&mut ctx, "nobody", "whatever").await;

    match result.unwrap_err().0 {
        BookingError::Authentication(message) => assert_eq!(message, "Invalid credentials"),
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut ctx = TestContext::new();
    let hash = auth::hash_password("super-secret").unwrap();

    ctx.user_repo
        .expect_get_user_by_username()
        .returning(move |username| {
            Ok(Some(DbUser {
                id: Uuid::new_v4(),
                username: username.to_string(),
                password_hash: hash.clone(),
                role: "faculty".to_string(),
                name: None,
                email: None,
                department: None,
                created_at: Utc::now(),
            }))
        });

    ctx.session_repo.expect_create_session().times(0);

    let result = login_flow(&mut ctx, "drfoster", "not-the-password").await;

    match result.unwrap_err().0 {
        BookingError::Authentication(message) => assert_eq!(message, "Invalid credentials"),
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_login_success_mints_session() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let hash = auth::hash_password("super-secret").unwrap();

    ctx.user_repo
        .expect_get_user_by_username()
        .with(predicate::eq("drfoster"))
        .returning(move |username| {
            Ok(Some(DbUser {
                id: user_id,
                username: username.to_string(),
                password_hash: hash.clone(),
                role: "admin".to_string(),
                name: Some("Dr. Foster".to_string()),
                email: None,
                department: None,
                created_at: Utc::now(),
            }))
        });

    ctx.session_repo
        .expect_create_session()
        .with(
            predicate::always(),
            predicate::eq(user_id),
            predicate::always(),
        )
        .times(1)
        .returning(|token, user_id, expires_at| {
            Ok(DbSession {
                token: token.to_string(),
                user_id,
                created_at: Utc::now(),
                expires_at,
            })
        });

    let response = login_flow(&mut ctx, "drfoster", "super-secret")
        .await
        .expect("Login should succeed");

    assert_eq!(response.token.len(), 48);
    assert_eq!(response.user.id, user_id);
    assert_eq!(response.user.role, UserRole::Admin);
}
