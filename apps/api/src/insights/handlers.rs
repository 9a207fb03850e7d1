use axum::{extract::State, Json};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::insights::service::insights_for_caller;
use crate::models::insight::IndustryInsight;
use crate::state::AppState;

/// GET /api/v1/insights
pub async fn handle_get_insights(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<IndustryInsight>, AppError> {
    Ok(Json(insights_for_caller(&state, &caller).await?))
}
