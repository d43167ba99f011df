use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::AppState;

/// Read-only proxy endpoints, mounted under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/headlines", get(handlers::headlines))
        .route("/search", get(handlers::search))
        .route("/trending", get(handlers::trending))
}
