use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::IdentityOracle;
use crate::cache::CacheInvalidator;
use crate::insights::synthesis::InsightSynthesizer;
use crate::llm_client::TextOracle;
use crate::store::{InsightRepository, UserRepository};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every handle here is process-wide and safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    /// Pool for the per-user records (cover letters, assessments, resumes).
    pub db: PgPool,
    pub insights: Arc<dyn InsightRepository>,
    pub users: Arc<dyn UserRepository>,
    pub oracle: Arc<dyn TextOracle>,
    pub synthesizer: InsightSynthesizer,
    pub identity: Arc<dyn IdentityOracle>,
    pub cache: Arc<dyn CacheInvalidator>,
}
