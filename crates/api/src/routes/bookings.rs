use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        // Static segment, so it never collides with the :id routes below
        .route(
            "/api/bookings/export",
            get(handlers::bookings::export_bookings),
        )
        .route(
            "/api/bookings/:id",
            patch(handlers::bookings::update_booking_status),
        )
        .route(
            "/api/bookings/:id",
            delete(handlers::bookings::cancel_booking),
        )
}
