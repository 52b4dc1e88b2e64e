pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::progress::handlers as progress_handlers;
use crate::state::AppState;
use crate::sync::handlers as sync_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sync workflow
        .route("/api/v1/sync", post(sync_handlers::handle_sync))
        .route(
            "/api/v1/attachments/discard",
            post(sync_handlers::handle_discard_attachments),
        )
        // Progress dashboard
        .route(
            "/api/v1/progress",
            get(progress_handlers::handle_get_progress),
        )
        .route(
            "/api/v1/applications",
            get(progress_handlers::handle_list_applications),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(progress_handlers::handle_apply_status),
        )
        .with_state(state)
}
