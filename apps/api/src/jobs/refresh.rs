//! Insight refresh job.
//!
//! Re-synthesizes stored insights and overwrites them in place. Each industry
//! is an independent unit of work run in its own task: a failed synthesis, a
//! failed write, or even a panic is recorded against that industry and the
//! loop moves on. Re-running an industry is always safe, so nothing is retried
//! here; the next trigger picks up whatever failed.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::insights::synthesis::InsightSynthesizer;
use crate::models::insight::IndustryInsight;
use crate::store::InsightRepository;

/// Which stored insights a run refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Every stored industry, regardless of its `next_update`.
    #[default]
    All,
    /// Only industries whose `next_update` has passed.
    Due,
}

impl RefreshPolicy {
    pub fn selects(&self, insight: &IndustryInsight, now: DateTime<Utc>) -> bool {
        match self {
            RefreshPolicy::All => true,
            RefreshPolicy::Due => insight.is_stale(now),
        }
    }
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RefreshPolicy::All),
            "due" => Ok(RefreshPolicy::Due),
            other => Err(format!("unknown refresh policy {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshFailure {
    pub industry: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<RefreshFailure>,
}

/// Runs one refresh pass. Only failing to list the industries fails the whole pass.
pub async fn refresh_insights(
    repo: Arc<dyn InsightRepository>,
    synthesizer: InsightSynthesizer,
    policy: RefreshPolicy,
) -> Result<RefreshReport, AppError> {
    let insights = repo.list().await?;
    let now = Utc::now();
    let mut report = RefreshReport::default();

    info!(
        "Insight refresh starting: {} industries, policy {policy:?}",
        insights.len()
    );

    for insight in insights {
        if !policy.selects(&insight, now) {
            report.skipped.push(insight.industry);
            continue;
        }
        let industry = insight.industry;

        let task = tokio::spawn(refresh_one(
            Arc::clone(&repo),
            synthesizer.clone(),
            industry.clone(),
        ));

        match task.await {
            Ok(Ok(updated)) => {
                info!(
                    "Refreshed insight for {industry:?}, next update {}",
                    updated.next_update
                );
                report.refreshed.push(industry);
            }
            Ok(Err(e)) => {
                warn!("Refresh failed for {industry:?}: {e}");
                report.failed.push(RefreshFailure {
                    industry,
                    error: e.to_string(),
                });
            }
            Err(join_error) => {
                error!("Refresh task for {industry:?} aborted: {join_error}");
                report.failed.push(RefreshFailure {
                    industry,
                    error: format!("refresh task aborted: {join_error}"),
                });
            }
        }
    }

    info!(
        "Insight refresh finished: {} refreshed, {} skipped, {} failed",
        report.refreshed.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn refresh_one(
    repo: Arc<dyn InsightRepository>,
    synthesizer: InsightSynthesizer,
    industry: String,
) -> Result<IndustryInsight, AppError> {
    let report = synthesizer.synthesize(&industry).await?;
    repo.update(&industry, &report, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::Duration;

    use super::*;
    use crate::models::insight::DemandLevel;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{sample_report, sample_report_json, ScriptedOracle};

    async fn seeded_store(created: DateTime<Utc>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new(StdDuration::from_secs(10)));
        for industry in ["Law", "Robotics"] {
            store
                .create(&IndustryInsight::new(industry, sample_report(), created))
                .await
                .unwrap();
        }
        store
    }

    fn changed_report_json() -> serde_json::Value {
        let mut body = sample_report_json();
        body["demandLevel"] = "Medium".into();
        body["growthRate"] = 12.5.into();
        body
    }

    #[tokio::test]
    async fn test_one_failing_industry_does_not_block_others() {
        let created = Utc::now() - Duration::days(3);
        let store = seeded_store(created).await;
        let law_before = store.get("Law").await.unwrap().unwrap();
        let oracle = ScriptedOracle::new()
            .fail("Law")
            .respond("Robotics", changed_report_json().to_string());
        let synth = InsightSynthesizer::new(Arc::new(oracle));

        let before = Utc::now();
        let report = refresh_insights(store.clone(), synth, RefreshPolicy::All)
            .await
            .unwrap();

        assert_eq!(report.refreshed, vec!["Robotics".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].industry, "Law");
        assert!(report.skipped.is_empty());

        let robotics = store.get("Robotics").await.unwrap().unwrap();
        assert!(robotics.last_updated >= before);
        assert!(robotics.next_update >= before + Duration::days(7));
        assert_eq!(robotics.report.demand_level, DemandLevel::Medium);
        assert!((robotics.report.growth_rate - 12.5).abs() < f64::EPSILON);

        assert_eq!(store.get("Law").await.unwrap().unwrap(), law_before);
    }

    #[tokio::test]
    async fn test_malformed_response_is_reported_per_industry() {
        let store = seeded_store(Utc::now()).await;
        let oracle = ScriptedOracle::new()
            .respond("Law", "I cannot help with that.".to_string())
            .respond("Robotics", sample_report_json().to_string());
        let synth = InsightSynthesizer::new(Arc::new(oracle));

        let report = refresh_insights(store, synth, RefreshPolicy::All)
            .await
            .unwrap();

        assert_eq!(report.refreshed, vec!["Robotics".to_string()]);
        assert!(report.failed[0].error.contains("Malformed oracle response"));
    }

    #[tokio::test]
    async fn test_due_policy_skips_fresh_industries() {
        let store = Arc::new(MemoryStore::new(StdDuration::from_secs(10)));
        store
            .create(&IndustryInsight::new(
                "Law",
                sample_report(),
                Utc::now() - Duration::days(8),
            ))
            .await
            .unwrap();
        store
            .create(&IndustryInsight::new("Robotics", sample_report(), Utc::now()))
            .await
            .unwrap();
        let oracle = ScriptedOracle::new().fallback(sample_report_json().to_string());
        let calls = oracle.call_counter();
        let synth = InsightSynthesizer::new(Arc::new(oracle));

        let report = refresh_insights(store, synth, RefreshPolicy::Due)
            .await
            .unwrap();

        assert_eq!(report.refreshed, vec!["Law".to_string()]);
        assert_eq!(report.skipped, vec!["Robotics".to_string()]);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_repository_is_a_no_op() {
        let store = Arc::new(MemoryStore::new(StdDuration::from_secs(10)));
        let synth = InsightSynthesizer::new(Arc::new(ScriptedOracle::new()));
        let report = refresh_insights(store, synth, RefreshPolicy::All)
            .await
            .unwrap();
        assert_eq!(report, RefreshReport::default());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("all".parse::<RefreshPolicy>(), Ok(RefreshPolicy::All));
        assert_eq!(" DUE ".parse::<RefreshPolicy>(), Ok(RefreshPolicy::Due));
        assert!("weekly".parse::<RefreshPolicy>().is_err());
        assert_eq!(RefreshPolicy::default(), RefreshPolicy::All);
    }

    #[test]
    fn test_due_policy_selects_only_stale() {
        let now = Utc::now();
        let fresh = IndustryInsight::new("Law", sample_report(), now);
        let stale = IndustryInsight::new("Law", sample_report(), now - Duration::days(7));
        assert!(RefreshPolicy::All.selects(&fresh, now));
        assert!(!RefreshPolicy::Due.selects(&fresh, now));
        assert!(RefreshPolicy::Due.selects(&stale, now));
    }
}
