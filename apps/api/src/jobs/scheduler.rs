//! Cron trigger for the insight refresh job.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::insights::synthesis::InsightSynthesizer;
use crate::jobs::refresh::{refresh_insights, RefreshPolicy};
use crate::store::InsightRepository;

/// Parses a cron expression (seconds field first, e.g. `0 0 0 * * Sun *`).
pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    Schedule::from_str(expr).with_context(|| format!("Invalid cron expression '{expr}'"))
}

pub fn next_fire_after(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

/// Spawns the background loop: sleep until the next fire time, refresh, repeat.
///
/// Runs alongside request traffic against the same repository.
pub fn spawn_refresh_scheduler(
    schedule: Schedule,
    insights: Arc<dyn InsightRepository>,
    synthesizer: InsightSynthesizer,
    policy: RefreshPolicy,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let Some(next) = next_fire_after(&schedule, now) else {
                warn!("Refresh schedule has no upcoming fire time; scheduler stopping");
                return;
            };
            info!("Next insight refresh at {next}");

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            match refresh_insights(Arc::clone(&insights), synthesizer.clone(), policy).await {
                Ok(report) => {
                    for failure in &report.failed {
                        warn!(
                            "Insight for {:?} not refreshed this run: {}",
                            failure.industry, failure.error
                        );
                    }
                }
                Err(e) => error!("Insight refresh run failed: {e}"),
            }
        }
    })
}
