use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One graded quiz question as stored on an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: String,
    pub answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_score: f64,
    pub questions: Json<Vec<QuestionResult>>,
    pub category: String,
    pub improvement_tip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
