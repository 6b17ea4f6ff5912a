//! # CampusBook API
//!
//! The API crate provides the web server implementation for the CampusBook
//! reservation service. It defines RESTful endpoints for authentication, hall
//! management, and the booking lifecycle, plus a WebSocket stream of changes.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication and error handling
//! - **Notify**: Fan out change events to connected observers
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication, logging, and error handling
pub mod middleware;
/// Broadcast channel behind the live event stream
pub mod notify;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::{http::StatusCode, Json, Router};
use eyre::Result;
use serde_json::json;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;

use crate::notify::ChangeNotifier;

/// Shared application state that is accessible to all request handlers
///
/// This struct encapsulates dependencies that are shared across the
/// application, such as the database connection and the event channel.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Broadcast channel that carries change events to observers
    pub notifier: ChangeNotifier,
    /// How long freshly minted sessions stay valid, in hours
    pub session_ttl_hours: u64,
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes the application, configures routes, spawns the
/// session sweeper, and starts the HTTP server. Logging is expected to be
/// set up by the caller before the server starts.
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and other settings
/// * `db_pool` - PostgreSQL connection pool for database operations
///
/// # Returns
///
/// * `Result<()>` - Success or error result
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Expired sessions are purged in the background for as long as the
    // server runs
    middleware::auth::spawn_session_sweeper(db_pool.clone());

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        notifier: ChangeNotifier::new(),
        session_ttl_hours: config.session_ttl_hours,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Authentication endpoints
        .merge(routes::auth::routes())
        // Hall catalog endpoints
        .merge(routes::halls::routes())
        // Booking lifecycle endpoints
        .merge(routes::bookings::routes())
        // User administration endpoints
        .merge(routes::users::routes())
        // Live event stream
        .merge(routes::events::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request tracing and timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(axum::error_handling::HandleErrorLayer::new(
                handle_middleware_error,
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .into_inner(),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Converts failures from the tower middleware stack into responses. The
/// only expected failure is the request timeout.
async fn handle_middleware_error(error: tower::BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        tracing::error!("Middleware failure: {}", error);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
    }
}
