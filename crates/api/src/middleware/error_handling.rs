//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the CampusBook API.
//! It maps domain-specific errors to appropriate HTTP status codes and JSON
//! error responses, ensuring a consistent error handling experience across
//! the entire API.
//!
//! Database and internal failures are logged with their full detail but
//! answered with a generic message, so storage errors never leak into
//! response bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campusbook_core::errors::BookingError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `BookingError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
///
/// # Example
///
/// ```
/// use campusbook_api::middleware::error_handling::AppError;
/// use campusbook_core::errors::BookingError;
///
/// fn booking_missing() -> AppError {
///     AppError(BookingError::NotFound("Booking not found".to_string()))
/// }
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

/// Converts application errors to HTTP responses
///
/// Each error variant maps to one status code; the body is always
/// `{"error": "<message>"}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::Authorization(_) => StatusCode::FORBIDDEN,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Persistence and internal failures are logged, not echoed. The
        // other variants put their bare message on the wire, without the
        // Display prefix.
        let message = match self.0 {
            err @ (BookingError::Database(_) | BookingError::Internal(_)) => {
                tracing::error!("Request failed: {}", err);
                "Internal server error".to_string()
            }
            BookingError::NotFound(message)
            | BookingError::Validation(message)
            | BookingError::Authentication(message)
            | BookingError::Authorization(message)
            | BookingError::Conflict(message) => message,
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Automatic conversion from BookingError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, BookingError>` in handler functions that return `Result<T, AppError>`.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Repository failures surface as `eyre::Report`; this wraps them in the
/// `BookingError::Database` variant so `?` works in handlers.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Database(err))
    }
}

/// Maps a BookingError to an HTTP response
///
/// Convenience for code that builds a response outside a `Result` chain,
/// such as extractors and fallback branches.
pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
