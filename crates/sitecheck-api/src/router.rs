use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Site evaluation
        .route("/api/v1/evaluate", post(handlers::evaluate_site))

        // Reference data
        .route("/api/v1/reference", get(handlers::reference_status))
        .route("/api/v1/reference/reload", post(handlers::reload_reference))

        .with_state(state)
}
