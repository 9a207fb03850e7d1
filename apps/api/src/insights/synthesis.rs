//! Insight synthesis: prompt the oracle for an industry analysis, normalize, validate.
//!
//! The oracle's output shape is enforced only by prompt wording, so nothing it
//! returns is trusted: the report must deserialize into `InsightReport` (closed
//! enumerations included) and meet the list-length minimums before it leaves here.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::insights::prompts::INSIGHT_PROMPT_TEMPLATE;
use crate::llm_client::normalize::normalize_json;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::TextOracle;
use crate::models::insight::InsightReport;

pub const MIN_SALARY_RANGES: usize = 5;
pub const MIN_TOP_SKILLS: usize = 5;
pub const MIN_KEY_TRENDS: usize = 5;

/// Produces validated `InsightReport`s. Cheap to clone; shares the oracle handle.
#[derive(Clone)]
pub struct InsightSynthesizer {
    oracle: Arc<dyn TextOracle>,
}

impl InsightSynthesizer {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// One synthesis attempt. Never retries; every failure aborts the attempt.
    pub async fn synthesize(&self, industry: &str) -> Result<InsightReport, AppError> {
        let industry = industry.trim();
        if industry.is_empty() {
            return Err(AppError::Validation(
                "industry must be a non-empty label".to_string(),
            ));
        }

        info!("Synthesizing insight for industry {industry:?}");
        let raw = self.oracle.generate(&build_insight_prompt(industry)).await?;
        let value = normalize_json(&raw)?;
        let report = validate_report(value).map_err(|e| {
            warn!("Insight for {industry:?} rejected: {e}");
            e
        })?;

        info!(
            "Insight for {industry:?} synthesized: {} salary bands, demand={}, outlook={}",
            report.salary_ranges.len(),
            report.demand_level,
            report.market_outlook
        );
        Ok(report)
    }
}

pub fn build_insight_prompt(industry: &str) -> String {
    INSIGHT_PROMPT_TEMPLATE
        .replace("{industry}", industry)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

/// Shapes a parsed oracle value into an `InsightReport`, enforcing the policy minimums.
pub fn validate_report(value: Value) -> Result<InsightReport, AppError> {
    let report: InsightReport =
        serde_json::from_value(value).map_err(|e| AppError::InsightShapeInvalid(e.to_string()))?;

    require_len("salaryRanges", report.salary_ranges.len(), MIN_SALARY_RANGES)?;
    require_len("topSkills", report.top_skills.len(), MIN_TOP_SKILLS)?;
    require_len("keyTrends", report.key_trends.len(), MIN_KEY_TRENDS)?;

    if !report.growth_rate.is_finite() {
        return Err(AppError::InsightShapeInvalid(
            "growthRate must be a finite number".to_string(),
        ));
    }

    for (i, band) in report.salary_ranges.iter().enumerate() {
        if band.role.trim().is_empty() {
            return Err(AppError::InsightShapeInvalid(format!(
                "salaryRanges[{i}].role is empty"
            )));
        }
        let finite = [band.min, band.max, band.median].iter().all(|n| n.is_finite());
        if !finite || band.min < 0.0 || band.min > band.max {
            return Err(AppError::InsightShapeInvalid(format!(
                "salaryRanges[{i}] ({}) has an invalid range {}..{}",
                band.role, band.min, band.max
            )));
        }
        if !(band.min..=band.max).contains(&band.median) {
            return Err(AppError::InsightShapeInvalid(format!(
                "salaryRanges[{i}] ({}) median {} lies outside {}..{}",
                band.role, band.median, band.min, band.max
            )));
        }
    }

    let blank = |items: &[String]| items.iter().any(|s| s.trim().is_empty());
    if blank(&report.top_skills) || blank(&report.key_trends) || blank(&report.recommended_skills)
    {
        return Err(AppError::InsightShapeInvalid(
            "skill and trend entries must be non-empty strings".to_string(),
        ));
    }

    Ok(report)
}

fn require_len(field: &str, actual: usize, min: usize) -> Result<(), AppError> {
    if actual < min {
        return Err(AppError::InsightShapeInvalid(format!(
            "{field} has {actual} entries, at least {min} required"
        )));
    }
    Ok(())
}
