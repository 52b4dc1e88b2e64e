use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::sync::orchestrator::{run_sync, SyncOutcome};

#[derive(Deserialize)]
pub struct SyncRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/sync
pub async fn handle_sync(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncOutcome>, AppError> {
    Ok(Json(run_sync(&state, req.user_id).await?))
}

#[derive(Deserialize)]
pub struct DiscardAttachmentsRequest {
    pub file_names: Vec<String>,
}

/// POST /api/v1/attachments/discard
/// Deletes attachments the user discarded without confirming. Best-effort:
/// a failed delete is logged, not surfaced, so a half-cleaned discard does
/// not block the dialog from closing.
pub async fn handle_discard_attachments(
    State(state): State<AppState>,
    Json(req): Json<DiscardAttachmentsRequest>,
) -> Result<StatusCode, AppError> {
    for file_name in &req.file_names {
        if let Err(e) = state.attachments.delete(file_name).await {
            warn!(%file_name, "attachment delete failed: {e}");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
