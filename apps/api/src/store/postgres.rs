use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgConnection;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::synthesis::InsightSynthesizer;
use crate::models::insight::{refresh_window, IndustryInsight, IndustryInsightRow, InsightReport};
use crate::models::user::{ProfileUpdate, User};
use crate::store::{within_budget, InsightRepository, UserRepository};

/// Postgres-backed repositories sharing one pool.
///
/// Expects `industry_insights.industry` and `users.clerk_user_id` to carry unique constraints.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    tx_budget: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, tx_budget: Duration) -> Self {
        Self { pool, tx_budget }
    }
}

#[async_trait]
impl InsightRepository for PgStore {
    async fn get(&self, industry: &str) -> Result<Option<IndustryInsight>, AppError> {
        sqlx::query_as::<_, IndustryInsightRow>(
            "SELECT * FROM industry_insights WHERE industry = $1",
        )
        .bind(industry)
        .fetch_optional(&self.pool)
        .await?
        .map(IndustryInsight::try_from)
        .transpose()
    }

    async fn create(&self, insight: &IndustryInsight) -> Result<(), AppError> {
        insert_insight(&self.pool, insight).await
    }

    async fn update(
        &self,
        industry: &str,
        report: &InsightReport,
        now: DateTime<Utc>,
    ) -> Result<IndustryInsight, AppError> {
        let (last_updated, next_update) = refresh_window(now);
        let row = sqlx::query_as::<_, IndustryInsightRow>(
            r#"
            UPDATE industry_insights
            SET salary_ranges = $2, growth_rate = $3, demand_level = $4, top_skills = $5,
                market_outlook = $6, key_trends = $7, recommended_skills = $8,
                last_updated = $9, next_update = $10
            WHERE industry = $1
            RETURNING *
            "#,
        )
        .bind(industry)
        .bind(Json(&report.salary_ranges))
        .bind(report.growth_rate)
        .bind(report.demand_level.as_str())
        .bind(&report.top_skills)
        .bind(report.market_outlook.as_str())
        .bind(&report.key_trends)
        .bind(&report.recommended_skills)
        .bind(last_updated)
        .bind(next_update)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No insight stored for {industry:?}")))?;

        IndustryInsight::try_from(row)
    }

    async fn list(&self) -> Result<Vec<IndustryInsight>, AppError> {
        sqlx::query_as::<_, IndustryInsightRow>(
            "SELECT * FROM industry_insights ORDER BY industry ASC",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(IndustryInsight::try_from)
        .collect()
    }

    async fn get_or_create(
        &self,
        industry: &str,
        synthesizer: &InsightSynthesizer,
    ) -> Result<IndustryInsight, AppError> {
        within_budget(self.tx_budget, async {
            let mut tx = self.pool.begin().await?;
            let insight = get_or_create_in_tx(&mut tx, industry, synthesizer).await?;
            tx.commit().await?;
            Ok(insight)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE clerk_user_id = $1")
                .bind(clerk_user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        synthesizer: &InsightSynthesizer,
    ) -> Result<(User, IndustryInsight), AppError> {
        within_budget(self.tx_budget, async {
            let mut tx = self.pool.begin().await?;

            let insight = get_or_create_in_tx(&mut tx, &update.industry, synthesizer).await?;

            let user = sqlx::query_as::<_, User>(
                r#"
                UPDATE users
                SET industry = $2, experience = $3, bio = $4, skills = $5, updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(&update.industry)
            .bind(update.experience)
            .bind(&update.bio)
            .bind(&update.skills)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::UserNotFound)?;

            tx.commit().await?;
            Ok((user, insight))
        })
        .await
    }
}

/// Read-or-synthesize on an open transaction.
///
/// A transaction-scoped advisory lock keyed on the industry serializes
/// concurrent creators, so the loser blocks and then sees the winner's row
/// instead of calling the oracle a second time. The unique constraint still
/// backs this up for writers that bypass the lock.
async fn get_or_create_in_tx(
    conn: &mut PgConnection,
    industry: &str,
    synthesizer: &InsightSynthesizer,
) -> Result<IndustryInsight, AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(industry)
        .execute(&mut *conn)
        .await?;

    let existing = sqlx::query_as::<_, IndustryInsightRow>(
        "SELECT * FROM industry_insights WHERE industry = $1",
    )
    .bind(industry)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = existing {
        return IndustryInsight::try_from(row);
    }

    let report = synthesizer.synthesize(industry).await?;
    let insight = IndustryInsight::new(industry, report, Utc::now());
    insert_insight(&mut *conn, &insight).await?;

    info!(
        "Created insight {} for industry {industry:?}, next update {}",
        insight.id, insight.next_update
    );
    Ok(insight)
}

async fn insert_insight<'e, E>(executor: E, insight: &IndustryInsight) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let report = &insight.report;
    sqlx::query(
        r#"
        INSERT INTO industry_insights
            (id, industry, salary_ranges, growth_rate, demand_level, top_skills,
             market_outlook, key_trends, recommended_skills, last_updated, next_update)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(insight.id)
    .bind(&insight.industry)
    .bind(Json(&report.salary_ranges))
    .bind(report.growth_rate)
    .bind(report.demand_level.as_str())
    .bind(&report.top_skills)
    .bind(report.market_outlook.as_str())
    .bind(&report.key_trends)
    .bind(&report.recommended_skills)
    .bind(insight.last_updated)
    .bind(insight.next_update)
    .execute(executor)
    .await?;
    Ok(())
}
