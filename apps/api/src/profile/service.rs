//! Profile updates and onboarding status.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{current_user, Caller};
use crate::errors::AppError;
use crate::models::user::{ProfileUpdate, User};
use crate::state::AppState;

pub const MAX_EXPERIENCE_YEARS: i32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub is_onboarded: bool,
}

/// Writes the caller's profile, creating the industry's insight in the same transaction.
///
/// A `UniquenessViolation` means another request created the insight between
/// our read and insert; the whole transaction is retried once, and the retry
/// finds the committed row.
pub async fn update_profile(
    state: &AppState,
    caller: &Caller,
    update: ProfileUpdate,
) -> Result<User, AppError> {
    let update = normalize_update(update)?;
    let user = current_user(state, caller).await?;

    let result = match state
        .users
        .update_profile(user.id, &update, &state.synthesizer)
        .await
    {
        Err(AppError::UniquenessViolation(msg)) => {
            warn!("Profile update for {} lost an insight race ({msg}), retrying", user.id);
            state
                .users
                .update_profile(user.id, &update, &state.synthesizer)
                .await
        }
        other => other,
    };
    let (updated, insight) = result?;

    info!(
        "Updated profile for user {} (industry {:?}, insight {})",
        updated.id, update.industry, insight.id
    );

    state.cache.invalidate("/").await;
    Ok(updated)
}

pub async fn onboarding_status(state: &AppState, caller: &Caller) -> Result<OnboardingStatus, AppError> {
    let user = current_user(state, caller).await?;
    Ok(OnboardingStatus {
        is_onboarded: user.is_onboarded(),
    })
}

/// Trims free-text fields, drops blank skills, and enforces field bounds.
pub fn normalize_update(update: ProfileUpdate) -> Result<ProfileUpdate, AppError> {
    let industry = update.industry.trim().to_string();
    if industry.is_empty() {
        return Err(AppError::Validation("industry is required".to_string()));
    }
    if !(0..=MAX_EXPERIENCE_YEARS).contains(&update.experience) {
        return Err(AppError::Validation(format!(
            "experience must be between 0 and {MAX_EXPERIENCE_YEARS} years"
        )));
    }

    let bio = update
        .bio
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());
    let skills = update
        .skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(ProfileUpdate {
        industry,
        experience: update.experience,
        bio,
        skills,
    })
}
