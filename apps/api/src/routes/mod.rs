pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::proposal::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction pipeline
        .route(
            "/api/v1/proposals/extract",
            post(handlers::handle_extract_text),
        )
        .route(
            "/api/v1/proposals/extract/upload",
            post(handlers::handle_extract_upload),
        )
        // Review submission + deck retrieval
        .route("/api/v1/proposals", post(handlers::handle_submit))
        .route(
            "/api/v1/proposals/latest/deck",
            get(handlers::handle_latest_deck),
        )
        .with_state(state)
}
