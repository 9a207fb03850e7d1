//! In-memory store used by tests.
//!
//! One async mutex guards both tables and is held for the whole unit of work,
//! synthesis included, which gives every transaction serializable isolation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::synthesis::InsightSynthesizer;
use crate::models::insight::{refresh_window, IndustryInsight, InsightReport};
use crate::models::user::{ProfileUpdate, User};
use crate::store::{within_budget, InsightRepository, UserRepository};

#[derive(Default)]
struct Tables {
    insights: HashMap<String, IndustryInsight>,
    users: HashMap<Uuid, User>,
    /// Row a simulated competing transaction commits just before our insert.
    competitor: Option<IndustryInsight>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    tx_budget: Duration,
}

impl MemoryStore {
    pub fn new(tx_budget: Duration) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            tx_budget,
        }
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.tables.lock().await.users.get(&id).cloned()
    }

    /// The next insert of `competitor.industry` will find this row already committed.
    pub async fn lose_next_race(&self, competitor: IndustryInsight) {
        self.tables.lock().await.competitor = Some(competitor);
    }
}

impl Tables {
    fn insert_insight(&mut self, insight: IndustryInsight) -> Result<(), AppError> {
        let raced = self
            .competitor
            .as_ref()
            .is_some_and(|c| c.industry == insight.industry);
        if raced {
            if let Some(winner) = self.competitor.take() {
                self.insights.insert(winner.industry.clone(), winner);
            }
        }
        if self.insights.contains_key(&insight.industry) {
            return Err(AppError::UniquenessViolation(format!(
                "industry_insights.industry = {:?}",
                insight.industry
            )));
        }
        self.insights.insert(insight.industry.clone(), insight);
        Ok(())
    }

    /// Returns the insight and whether it still needs inserting.
    async fn read_or_synthesize(
        &self,
        industry: &str,
        synthesizer: &InsightSynthesizer,
    ) -> Result<(IndustryInsight, bool), AppError> {
        if let Some(existing) = self.insights.get(industry) {
            return Ok((existing.clone(), false));
        }
        let report = synthesizer.synthesize(industry).await?;
        Ok((IndustryInsight::new(industry, report, Utc::now()), true))
    }
}

#[async_trait]
impl InsightRepository for MemoryStore {
    async fn get(&self, industry: &str) -> Result<Option<IndustryInsight>, AppError> {
        Ok(self.tables.lock().await.insights.get(industry).cloned())
    }

    async fn create(&self, insight: &IndustryInsight) -> Result<(), AppError> {
        self.tables.lock().await.insert_insight(insight.clone())
    }

    async fn update(
        &self,
        industry: &str,
        report: &InsightReport,
        now: DateTime<Utc>,
    ) -> Result<IndustryInsight, AppError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .insights
            .get_mut(industry)
            .ok_or_else(|| AppError::NotFound(format!("No insight stored for {industry:?}")))?;
        let (last_updated, next_update) = refresh_window(now);
        stored.report = report.clone();
        stored.last_updated = last_updated;
        stored.next_update = next_update;
        Ok(stored.clone())
    }

    async fn list(&self) -> Result<Vec<IndustryInsight>, AppError> {
        let tables = self.tables.lock().await;
        let mut all: Vec<_> = tables.insights.values().cloned().collect();
        all.sort_by(|a, b| a.industry.cmp(&b.industry));
        Ok(all)
    }

    async fn get_or_create(
        &self,
        industry: &str,
        synthesizer: &InsightSynthesizer,
    ) -> Result<IndustryInsight, AppError> {
        within_budget(self.tx_budget, async {
            let mut tables = self.tables.lock().await;
            let (insight, is_new) = tables.read_or_synthesize(industry, synthesizer).await?;
            if is_new {
                tables.insert_insight(insight.clone())?;
            }
            Ok(insight)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.clerk_user_id == clerk_user_id)
            .cloned())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        synthesizer: &InsightSynthesizer,
    ) -> Result<(User, IndustryInsight), AppError> {
        within_budget(self.tx_budget, async {
            let mut tables = self.tables.lock().await;
            let (insight, is_new) = tables
                .read_or_synthesize(&update.industry, synthesizer)
                .await?;

            let mut user = tables
                .users
                .get(&user_id)
                .cloned()
                .ok_or(AppError::UserNotFound)?;
            user.industry = Some(update.industry.clone());
            user.experience = Some(update.experience);
            user.bio = update.bio.clone();
            user.skills = update.skills.clone();
            user.updated_at = Utc::now();

            // Commit point: nothing above has been written yet.
            if is_new {
                tables.insert_insight(insight.clone())?;
            }
            tables.users.insert(user_id, user.clone());
            Ok((user, insight))
        })
        .await
    }
}
