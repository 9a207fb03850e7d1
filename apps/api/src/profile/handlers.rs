use axum::{extract::State, Json};

use crate::auth::{current_user, Caller};
use crate::errors::AppError;
use crate::models::user::{ProfileUpdate, User};
use crate::profile::service::{onboarding_status, update_profile, OnboardingStatus};
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<User>, AppError> {
    Ok(Json(current_user(&state, &caller).await?))
}

/// PUT /api/v1/profile
///
/// Onboarding and later edits. Creates the industry insight on first use.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    Ok(Json(update_profile(&state, &caller, update).await?))
}

/// GET /api/v1/onboarding
pub async fn handle_onboarding_status(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<OnboardingStatus>, AppError> {
    Ok(Json(onboarding_status(&state, &caller).await?))
}
