mod auth;
mod cache;
mod config;
mod cover_letter;
mod db;
mod errors;
mod insights;
mod interview;
mod jobs;
mod llm_client;
mod models;
mod profile;
mod resume;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::HeaderIdentity;
use crate::cache::RedisInvalidator;
use crate::config::Config;
use crate::db::create_pool;
use crate::insights::synthesis::InsightSynthesizer;
use crate::jobs::scheduler::{parse_schedule, spawn_refresh_scheduler};
use crate::llm_client::{GeminiClient, TextOracle};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerLift API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db.clone(), config.insight_tx_timeout));
    info!(
        "Insight transactions bounded to {}s",
        config.insight_tx_timeout.as_secs()
    );

    // Initialize Redis (cache invalidation notices)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize model client
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("Model client initialized (model: {})", gemini.model());
    let oracle: Arc<dyn TextOracle> = Arc::new(gemini);
    let synthesizer = InsightSynthesizer::new(oracle.clone());

    // Weekly insight refresh
    let schedule = parse_schedule(&config.insight_refresh_cron)?;
    let _refresh = spawn_refresh_scheduler(
        schedule,
        store.clone(),
        synthesizer.clone(),
        config.insight_refresh_policy,
    );

    // Build app state
    let state = AppState {
        db,
        insights: store.clone(),
        users: store,
        oracle,
        synthesizer,
        identity: Arc::new(HeaderIdentity::new(&config.identity_header)?),
        cache: Arc::new(RedisInvalidator::new(redis)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web tier once its domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
