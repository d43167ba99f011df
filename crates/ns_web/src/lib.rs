use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let mut router = Router::new().nest("/api", routes::api_routes());
    router = match &state.public_dir {
        Some(dir) => {
            let not_found = ServeFile::new(dir.join("404.html"));
            router.fallback_service(ServeDir::new(dir).not_found_service(not_found))
        }
        None => router.fallback(handlers::not_found),
    };

    router
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌍 NewsSphere server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use ns_core::{Article, Error, Result};
}
