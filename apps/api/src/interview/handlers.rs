//! Axum route handlers for the Interview API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::interview::quiz::{
    generate_quiz, list_assessments, save_quiz_result, QuizQuestion, QuizSubmission,
};
use crate::models::assessment::AssessmentRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

/// POST /api/v1/interview/quiz
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<QuizResponse>, AppError> {
    let questions = generate_quiz(&state, &caller).await?;
    Ok(Json(QuizResponse { questions }))
}

/// POST /api/v1/interview/assessments
pub async fn handle_save_assessment(
    State(state): State<AppState>,
    caller: Caller,
    Json(submission): Json<QuizSubmission>,
) -> Result<Json<AssessmentRow>, AppError> {
    Ok(Json(save_quiz_result(&state, &caller, submission).await?))
}

/// GET /api/v1/interview/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<AssessmentRow>>, AppError> {
    Ok(Json(list_assessments(&state, &caller).await?))
}
