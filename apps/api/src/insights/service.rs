//! Insight read path for the dashboard.

use crate::auth::{current_user, Caller};
use crate::errors::AppError;
use crate::models::insight::IndustryInsight;
use crate::state::AppState;
use crate::store::ensure_insight;

/// Returns the insight for the caller's industry, synthesizing it on first read.
pub async fn insights_for_caller(state: &AppState, caller: &Caller) -> Result<IndustryInsight, AppError> {
    let user = current_user(state, caller).await?;
    let industry = user
        .industry
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Complete onboarding to choose an industry first".to_string())
        })?;

    ensure_insight(state.insights.as_ref(), industry, &state.synthesizer).await
}
