use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationStatus, JobApplicationRow};
use crate::models::progress::Progress;
use crate::progress::reconciler;
use crate::state::AppState;
use crate::store::applications;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Progress>, AppError> {
    Ok(Json(reconciler::aggregate(&state.db, params.user_id).await?))
}

/// GET /api/v1/applications
/// All of a user's applications with ids, for the confirmation dialog.
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<JobApplicationRow>>, AppError> {
    Ok(Json(
        applications::list_by_user(&state.db, params.user_id).await?,
    ))
}

#[derive(Deserialize)]
pub struct StatusChangeRequest {
    pub status_id: i16,
}

/// PATCH /api/v1/applications/:id/status
/// Status id 5 (rejected) deletes the application instead of updating it.
pub async fn handle_apply_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<StatusCode, AppError> {
    let status = ApplicationStatus::from_id(req.status_id)
        .ok_or_else(|| AppError::Validation(format!("unknown status id {}", req.status_id)))?;
    reconciler::apply_status(&state.db, id, status).await?;
    Ok(StatusCode::NO_CONTENT)
}
