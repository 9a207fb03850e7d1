//! Axum route handlers for the Resume API.

use axum::{extract::State, Json};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::builder::{
    get_resume, improve_with_ai, save_resume, ImproveRequest, ImproveResponse, SaveResumeRequest,
};
use crate::state::AppState;

/// PUT /api/v1/resume
pub async fn handle_save_resume(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<SaveResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(save_resume(&state, &caller, request).await?))
}

/// GET /api/v1/resume
///
/// `null` when the caller has not saved a resume yet.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Option<ResumeRow>>, AppError> {
    Ok(Json(get_resume(&state, &caller).await?))
}

/// POST /api/v1/resume/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    Ok(Json(improve_with_ai(&state, &caller, request).await?))
}
