//! Repositories for insights and users.
//!
//! Both traits are carried in `AppState` as trait objects. `PgStore` is the
//! production implementation; `memory::MemoryStore` mirrors its transactional
//! contract for tests.
//!
//! Contract for `get_or_create`: the read and the conditional insert form one
//! transaction bounded by a time budget. An existing row is returned without
//! touching the oracle. A competing insert of the same key surfaces as
//! `UniquenessViolation`; `ensure_insight` resolves that by re-reading.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::synthesis::InsightSynthesizer;
use crate::models::insight::{IndustryInsight, InsightReport};
use crate::models::user::{ProfileUpdate, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait InsightRepository: Send + Sync {
    async fn get(&self, industry: &str) -> Result<Option<IndustryInsight>, AppError>;

    /// Inserts a complete record. Fails with `UniquenessViolation` if the industry exists.
    async fn create(&self, insight: &IndustryInsight) -> Result<(), AppError>;

    /// Overwrites the stored report for `industry` and restarts its refresh clock at `now`.
    async fn update(
        &self,
        industry: &str,
        report: &InsightReport,
        now: DateTime<Utc>,
    ) -> Result<IndustryInsight, AppError>;

    /// Every stored insight, ordered by industry.
    async fn list(&self) -> Result<Vec<IndustryInsight>, AppError>;

    /// Read-or-synthesize inside one bounded transaction.
    async fn get_or_create(
        &self,
        industry: &str,
        synthesizer: &InsightSynthesizer,
    ) -> Result<IndustryInsight, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>, AppError>;

    /// Ensures the declared industry has an insight, then writes the profile fields.
    /// Both writes commit together or neither does.
    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        synthesizer: &InsightSynthesizer,
    ) -> Result<(User, IndustryInsight), AppError>;
}

/// Runs a transactional unit of work, failing with `TransactionTimeout` past `budget`.
///
/// The future is dropped on timeout, which rolls back any open transaction it owns.
pub async fn within_budget<T, F>(budget: Duration, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(budget, work)
        .await
        .map_err(|_| AppError::TransactionTimeout(budget))?
}

/// `get_or_create`, treating a lost insert race as "someone else created it".
pub async fn ensure_insight(
    repo: &dyn InsightRepository,
    industry: &str,
    synthesizer: &InsightSynthesizer,
) -> Result<IndustryInsight, AppError> {
    match repo.get_or_create(industry, synthesizer).await {
        Err(AppError::UniquenessViolation(msg)) => {
            info!("Insight for {industry:?} was created concurrently, re-reading");
            repo.get(industry)
                .await?
                .ok_or(AppError::UniquenessViolation(msg))
        }
        other => other,
    }
}
