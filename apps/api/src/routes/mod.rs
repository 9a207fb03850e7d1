pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cover_letter::handlers as cover_letters;
use crate::insights::handlers as insights;
use crate::interview::handlers as interview;
use crate::profile::handlers as profile;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Onboarding & profile
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route("/api/v1/onboarding", get(profile::handle_onboarding_status))
        // Industry insights
        .route("/api/v1/insights", get(insights::handle_get_insights))
        // Cover letters
        .route(
            "/api/v1/cover-letters",
            get(cover_letters::handle_list_cover_letters)
                .post(cover_letters::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id",
            get(cover_letters::handle_get_cover_letter)
                .delete(cover_letters::handle_delete_cover_letter),
        )
        // Interview preparation
        .route("/api/v1/interview/quiz", post(interview::handle_generate_quiz))
        .route(
            "/api/v1/interview/assessments",
            get(interview::handle_list_assessments).post(interview::handle_save_assessment),
        )
        // Resume
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume).put(resume::handle_save_resume),
        )
        .route("/api/v1/resume/improve", post(resume::handle_improve))
        .with_state(state)
}
