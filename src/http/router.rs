//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Slot CRUD
        .route("/slots", get(handlers::list_slots))
        .route("/slots", post(handlers::create_slot))
        .route("/slots/place-batch", post(handlers::place_batch))
        .route("/slots/{id}", get(handlers::get_slot))
        .route("/slots/{id}", put(handlers::edit_slot))
        .route("/slots/{id}", axum::routing::delete(handlers::delete_slot))
        // Job management
        .route("/jobs/{job_id}", get(handlers::get_job_status))
        .route("/jobs/{job_id}/cancel", post(handlers::cancel_job))
        .route("/jobs/{job_id}/logs", get(handlers::stream_job_logs))
        // Projection endpoints
        .route("/sessions/history", get(handlers::history_window))
        .route("/sessions/upcoming", get(handlers::upcoming))
        .route("/sessions/current-week", get(handlers::current_week))
        // Free-resource suggestions
        .route("/resources/free", get(handlers::free_resources));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo =
            Arc::new(LocalRepository::new()) as Arc<dyn crate::db::repository::FullRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
