//! Axum route handlers for the Cover Letter API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::Caller;
use crate::cover_letter::generator::{
    delete_cover_letter, generate_cover_letter, get_cover_letter, list_cover_letters,
    CoverLetterRequest,
};
use crate::errors::AppError;
use crate::models::cover_letter::CoverLetterRow;
use crate::state::AppState;

/// POST /api/v1/cover-letters
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterRow>, AppError> {
    Ok(Json(generate_cover_letter(&state, &caller, request).await?))
}

/// GET /api/v1/cover-letters
pub async fn handle_list_cover_letters(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CoverLetterRow>>, AppError> {
    Ok(Json(list_cover_letters(&state, &caller).await?))
}

/// GET /api/v1/cover-letters/:id
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CoverLetterRow>, AppError> {
    Ok(Json(get_cover_letter(&state, &caller, id).await?))
}

/// DELETE /api/v1/cover-letters/:id
pub async fn handle_delete_cover_letter(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CoverLetterRow>, AppError> {
    Ok(Json(delete_cover_letter(&state, &caller, id).await?))
}
