//! Quiz generation, grading, and assessment storage.
//!
//! Saving a result is the one flow that tolerates a partial failure: if the
//! improvement-tip call fails, the assessment is still stored without a tip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{current_user, Caller};
use crate::errors::AppError;
use crate::interview::prompts::{IMPROVEMENT_TIP_PROMPT_TEMPLATE, QUIZ_PROMPT_TEMPLATE};
use crate::llm_client::normalize::normalize_json;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::TextOracle;
use crate::models::assessment::{AssessmentRow, QuestionResult};
use crate::state::AppState;

pub const QUIZ_QUESTION_COUNT: usize = 10;
pub const OPTIONS_PER_QUESTION: usize = 4;
pub const ASSESSMENT_CATEGORY: &str = "Technical";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub questions: Vec<QuizQuestion>,
    pub answers: Vec<Option<String>>,
    pub score: f64,
}

pub fn build_quiz_prompt(industry: &str, skills: &[String]) -> String {
    let skills_clause = if skills.is_empty() {
        String::new()
    } else {
        format!(" with expertise in {}", skills.join(", "))
    };
    QUIZ_PROMPT_TEMPLATE
        .replace("{question_count}", &QUIZ_QUESTION_COUNT.to_string())
        .replace("{industry}", industry)
        .replace("{skills_clause}", &skills_clause)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

/// Every question needs four options with the correct answer among them.
pub fn validate_quiz(value: Value) -> Result<Vec<QuizQuestion>, AppError> {
    let payload: QuizPayload =
        serde_json::from_value(value).map_err(|e| AppError::InsightShapeInvalid(e.to_string()))?;

    if payload.questions.is_empty() {
        return Err(AppError::InsightShapeInvalid(
            "quiz contains no questions".to_string(),
        ));
    }
    for (i, q) in payload.questions.iter().enumerate() {
        if q.options.len() != OPTIONS_PER_QUESTION {
            return Err(AppError::InsightShapeInvalid(format!(
                "question {i} has {} options, expected {OPTIONS_PER_QUESTION}",
                q.options.len()
            )));
        }
        if !q.options.contains(&q.correct_answer) {
            return Err(AppError::InsightShapeInvalid(format!(
                "question {i} correctAnswer is not one of its options"
            )));
        }
    }
    Ok(payload.questions)
}

pub async fn generate_quiz(state: &AppState, caller: &Caller) -> Result<Vec<QuizQuestion>, AppError> {
    let user = current_user(state, caller).await?;
    let industry = user.industry.as_deref().ok_or_else(|| {
        AppError::Validation("Complete onboarding to choose an industry first".to_string())
    })?;

    let raw = state
        .oracle
        .generate(&build_quiz_prompt(industry, &user.skills))
        .await?;
    let questions = validate_quiz(normalize_json(&raw)?)?;

    info!("Generated {} quiz questions for user {}", questions.len(), user.id);
    Ok(questions)
}

/// Pairs each question with the submitted answer. Missing answers grade as wrong.
pub fn grade(questions: &[QuizQuestion], answers: &[Option<String>]) -> Vec<QuestionResult> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let user_answer = answers.get(i).cloned().flatten();
            QuestionResult {
                question: q.question.clone(),
                answer: q.correct_answer.clone(),
                is_correct: user_answer.as_deref() == Some(q.correct_answer.as_str()),
                user_answer,
                explanation: q.explanation.clone(),
            }
        })
        .collect()
}

/// `None` when every answer was correct.
pub fn build_tip_prompt(industry: &str, results: &[QuestionResult]) -> Option<String> {
    let wrong: Vec<String> = results
        .iter()
        .filter(|r| !r.is_correct)
        .map(|r| {
            format!(
                "Question: \"{}\"\nCorrect Answer: \"{}\"\nUser Answer: \"{}\"",
                r.question,
                r.answer,
                r.user_answer.as_deref().unwrap_or("")
            )
        })
        .collect();

    if wrong.is_empty() {
        return None;
    }
    Some(
        IMPROVEMENT_TIP_PROMPT_TEMPLATE
            .replace("{industry}", industry)
            .replace("{wrong_answers}", &wrong.join("\n\n")),
    )
}

/// Asks for a short study tip. Any failure degrades to no tip.
pub async fn improvement_tip(
    oracle: &dyn TextOracle,
    industry: &str,
    results: &[QuestionResult],
) -> Option<String> {
    let prompt = build_tip_prompt(industry, results)?;
    match oracle.generate(&prompt).await {
        Ok(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        Err(e) => {
            warn!("Improvement tip generation failed, saving without tip: {e}");
            None
        }
    }
}

pub async fn save_quiz_result(
    state: &AppState,
    caller: &Caller,
    submission: QuizSubmission,
) -> Result<AssessmentRow, AppError> {
    if !(0.0..=100.0).contains(&submission.score) {
        return Err(AppError::Validation(
            "score must be between 0 and 100".to_string(),
        ));
    }
    let user = current_user(state, caller).await?;

    let results = grade(&submission.questions, &submission.answers);
    let industry = user.industry.as_deref().unwrap_or("general");
    let tip = improvement_tip(state.oracle.as_ref(), industry, &results).await;

    let assessment = sqlx::query_as::<_, AssessmentRow>(
        r#"
        INSERT INTO assessments (id, user_id, quiz_score, questions, category, improvement_tip)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(submission.score)
    .bind(Json(&results))
    .bind(ASSESSMENT_CATEGORY)
    .bind(&tip)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Saved assessment {} for user {} (score {:.1}, tip: {})",
        assessment.id,
        user.id,
        submission.score,
        tip.is_some()
    );
    Ok(assessment)
}

/// Oldest first.
pub async fn list_assessments(state: &AppState, caller: &Caller) -> Result<Vec<AssessmentRow>, AppError> {
    let user = current_user(state, caller).await?;
    Ok(sqlx::query_as::<_, AssessmentRow>(
        "SELECT * FROM assessments WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?)
}
