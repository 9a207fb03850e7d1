//! Cover letter generation and per-user storage.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{current_user, Caller};
use crate::cover_letter::prompts::COVER_LETTER_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::models::cover_letter::CoverLetterRow;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub job_title: String,
    pub company_name: String,
    #[serde(default)]
    pub job_description: String,
}

impl CoverLetterRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.job_title.trim().is_empty() {
            return Err(AppError::Validation("jobTitle cannot be empty".to_string()));
        }
        if self.company_name.trim().is_empty() {
            return Err(AppError::Validation("companyName cannot be empty".to_string()));
        }
        Ok(())
    }
}

pub fn build_cover_letter_prompt(user: &User, request: &CoverLetterRequest) -> String {
    let experience = user
        .experience
        .map(|y| y.to_string())
        .unwrap_or_else(|| "not specified".to_string());

    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{job_title}", request.job_title.trim())
        .replace("{company_name}", request.company_name.trim())
        .replace("{industry}", user.industry.as_deref().unwrap_or("not specified"))
        .replace("{experience}", &experience)
        .replace("{skills}", &user.skills.join(", "))
        .replace("{bio}", user.bio.as_deref().unwrap_or(""))
        .replace("{job_description}", request.job_description.trim())
}

/// Generates a letter with the oracle and stores it with status `completed`.
pub async fn generate_cover_letter(
    state: &AppState,
    caller: &Caller,
    request: CoverLetterRequest,
) -> Result<CoverLetterRow, AppError> {
    request.validate()?;
    let user = current_user(state, caller).await?;

    let prompt = build_cover_letter_prompt(&user, &request);
    let content = state.oracle.generate(&prompt).await?.trim().to_string();

    let letter = sqlx::query_as::<_, CoverLetterRow>(
        r#"
        INSERT INTO cover_letters
            (id, user_id, content, job_description, company_name, job_title, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'completed')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&content)
    .bind(&request.job_description)
    .bind(request.company_name.trim())
    .bind(request.job_title.trim())
    .fetch_one(&state.db)
    .await?;

    info!(
        "Generated cover letter {} for user {} ({} at {})",
        letter.id, user.id, letter.job_title, letter.company_name
    );
    Ok(letter)
}

/// Newest first.
pub async fn list_cover_letters(
    state: &AppState,
    caller: &Caller,
) -> Result<Vec<CoverLetterRow>, AppError> {
    let user = current_user(state, caller).await?;
    Ok(sqlx::query_as::<_, CoverLetterRow>(
        "SELECT * FROM cover_letters WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?)
}

pub async fn get_cover_letter(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> Result<CoverLetterRow, AppError> {
    let user = current_user(state, caller).await?;
    sqlx::query_as::<_, CoverLetterRow>(
        "SELECT * FROM cover_letters WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cover letter {id} not found")))
}

pub async fn delete_cover_letter(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> Result<CoverLetterRow, AppError> {
    let user = current_user(state, caller).await?;
    let deleted = sqlx::query_as::<_, CoverLetterRow>(
        "DELETE FROM cover_letters WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cover letter {id} not found")))?;

    info!("Deleted cover letter {id} for user {}", user.id);
    Ok(deleted)
}
