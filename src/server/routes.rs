//! Router configuration for the HTTP API.

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::AppState;
use super::handlers;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/list", get(handlers::list_all))
        .route("/annotators", get(handlers::list_annotators))
        .route("/models", get(handlers::list_models))
        .route(
            "/annotate",
            get(handlers::annotate_get).post(handlers::annotate_post),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
