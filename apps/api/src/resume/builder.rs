//! Resume storage (one markdown document per user) and section rewrites.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{current_user, Caller};
use crate::errors::AppError;
use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;
use crate::models::resume::ResumeRow;
use crate::resume::prompts::IMPROVE_PROMPT_TEMPLATE;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SaveResumeRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImproveRequest {
    pub current: String,
    /// Resume section being rewritten, e.g. "experience" or "project".
    #[serde(rename = "type")]
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImproveResponse {
    pub improved: String,
}

/// Inserts or replaces the caller's resume.
pub async fn save_resume(
    state: &AppState,
    caller: &Caller,
    request: SaveResumeRequest,
) -> Result<ResumeRow, AppError> {
    let user = current_user(state, caller).await?;

    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, user_id, content)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&request.content)
    .fetch_one(&state.db)
    .await?;

    info!("Saved resume {} for user {}", resume.id, user.id);
    state.cache.invalidate("/resume").await;
    Ok(resume)
}

pub async fn get_resume(state: &AppState, caller: &Caller) -> Result<Option<ResumeRow>, AppError> {
    let user = current_user(state, caller).await?;
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?,
    )
}

pub fn build_improve_prompt(industry: &str, request: &ImproveRequest) -> String {
    IMPROVE_PROMPT_TEMPLATE
        .replace("{section}", request.section.trim())
        .replace("{industry}", industry)
        .replace("{current}", request.current.trim())
        .replace("{plain_text}", PLAIN_TEXT_INSTRUCTION)
}

/// Rewrites one resume section for the caller's industry. Nothing is stored.
pub async fn improve_with_ai(
    state: &AppState,
    caller: &Caller,
    request: ImproveRequest,
) -> Result<ImproveResponse, AppError> {
    if request.current.trim().is_empty() {
        return Err(AppError::Validation("current cannot be empty".to_string()));
    }
    let user = current_user(state, caller).await?;
    let industry = user.industry.as_deref().unwrap_or("general");

    let improved = state
        .oracle
        .generate(&build_improve_prompt(industry, &request))
        .await?
        .trim()
        .to_string();

    Ok(ImproveResponse { improved })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_user, ScriptedOracle, TestApp};

    fn improve_request() -> ImproveRequest {
        ImproveRequest {
            current: "Worked on robot arms.".to_string(),
            section: "experience".to_string(),
        }
    }

    #[test]
    fn test_improve_prompt_fills_every_placeholder() {
        let prompt = build_improve_prompt("Robotics", &improve_request());
        assert!(prompt.contains("improve the following experience description for a Robotics professional"));
        assert!(prompt.contains("Current content: \"Worked on robot arms.\""));
        assert!(prompt.contains("single paragraph"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_improve_request_reads_type_field() {
        let request: ImproveRequest =
            serde_json::from_str(r#"{"current": "x", "type": "project"}"#).unwrap();
        assert_eq!(request.section, "project");
    }

    #[tokio::test]
    async fn test_improve_returns_trimmed_oracle_text() {
        let oracle = ScriptedOracle::new().respond(
            "Robotics professional",
            "\n  Led design of 6-axis robot arms, cutting cycle time 18%.  \n".to_string(),
        );
        let app = TestApp::new(oracle);
        let mut user = sample_user("u1");
        user.industry = Some("Robotics".to_string());
        app.store.insert_user(user).await;

        let response = improve_with_ai(&app.state, &Caller("u1".into()), improve_request())
            .await
            .unwrap();
        assert_eq!(
            response.improved,
            "Led design of 6-axis robot arms, cutting cycle time 18%."
        );
    }

    #[tokio::test]
    async fn test_improve_oracle_failure_propagates() {
        let app = TestApp::new(ScriptedOracle::new().fail("Robotics professional"));
        let mut user = sample_user("u1");
        user.industry = Some("Robotics".to_string());
        app.store.insert_user(user).await;

        let err = improve_with_ai(&app.state, &Caller("u1".into()), improve_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_improve_rejects_blank_content() {
        let app = TestApp::new(ScriptedOracle::new());
        let mut request = improve_request();
        request.current = "  ".to_string();
        let err = improve_with_ai(&app.state, &Caller("u1".into()), request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
