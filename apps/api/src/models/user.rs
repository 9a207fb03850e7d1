use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A CareerLift user. `clerk_user_id` is the stable caller id issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub clerk_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_onboarded(&self) -> bool {
        self.industry.as_deref().is_some_and(|i| !i.trim().is_empty())
    }
}

/// Profile fields written during onboarding and on later profile edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub industry: String,
    pub experience: i32,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}
