use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/halls", get(handlers::halls::list_halls))
        .route("/api/halls", post(handlers::halls::create_hall))
        .route("/api/halls/:id", delete(handlers::halls::delete_hall))
}
