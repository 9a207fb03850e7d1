//! Industry insight records: the per-industry analysis shared by every user in that industry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Insights are considered stale this many days after they were written.
pub const REFRESH_INTERVAL_DAYS: i64 = 7;

pub fn refresh_interval() -> Duration {
    Duration::days(REFRESH_INTERVAL_DAYS)
}

/// `(last_updated, next_update)` for a report written at `now`.
///
/// Both the first insert and every overwrite restart the clock from here.
pub fn refresh_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + refresh_interval())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOutlook {
    Positive,
    Neutral,
    Negative,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
        }
    }
}

impl MarketOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketOutlook::Positive => "Positive",
            MarketOutlook::Neutral => "Neutral",
            MarketOutlook::Negative => "Negative",
        }
    }
}

impl FromStr for DemandLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(DemandLevel::High),
            "Medium" => Ok(DemandLevel::Medium),
            "Low" => Ok(DemandLevel::Low),
            other => Err(format!("unknown demand level {other:?}")),
        }
    }
}

impl FromStr for MarketOutlook {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(MarketOutlook::Positive),
            "Neutral" => Ok(MarketOutlook::Neutral),
            "Negative" => Ok(MarketOutlook::Negative),
            other => Err(format!("unknown market outlook {other:?}")),
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MarketOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compensation band for one role in an industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub location: String,
}

/// The synthesized analysis body. Field names are the JSON contract shared with the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

/// A stored insight: always a complete report plus its refresh bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsight {
    pub id: Uuid,
    pub industry: String,
    #[serde(flatten)]
    pub report: InsightReport,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl IndustryInsight {
    /// Builds a freshly synthesized record, due for refresh one interval from `now`.
    pub fn new(industry: &str, report: InsightReport, now: DateTime<Utc>) -> Self {
        let (last_updated, next_update) = refresh_window(now);
        Self {
            id: Uuid::new_v4(),
            industry: industry.to_string(),
            report,
            last_updated,
            next_update,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.next_update <= now
    }
}

/// Database row for `industry_insights`. Enumerations are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct IndustryInsightRow {
    pub id: Uuid,
    pub industry: String,
    pub salary_ranges: Json<Vec<SalaryRange>>,
    pub growth_rate: f64,
    pub demand_level: String,
    pub top_skills: Vec<String>,
    pub market_outlook: String,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl TryFrom<IndustryInsightRow> for IndustryInsight {
    type Error = AppError;

    fn try_from(row: IndustryInsightRow) -> Result<Self, Self::Error> {
        let demand_level = row
            .demand_level
            .parse::<DemandLevel>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("industry {}: {e}", row.industry)))?;
        let market_outlook = row
            .market_outlook
            .parse::<MarketOutlook>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("industry {}: {e}", row.industry)))?;

        Ok(IndustryInsight {
            id: row.id,
            industry: row.industry,
            report: InsightReport {
                salary_ranges: row.salary_ranges.0,
                growth_rate: row.growth_rate,
                demand_level,
                top_skills: row.top_skills,
                market_outlook,
                key_trends: row.key_trends,
                recommended_skills: row.recommended_skills,
            },
            last_updated: row.last_updated,
            next_update: row.next_update,
        })
    }
}
