//! Score records and the arithmetic that combines them.
//!
//! Manual scores are weighted by reviewer role and averaged into a calculated score that a
//! human may accept or override. AI scores are carried for display only.

mod aggregator;
mod validation;
mod weights;

pub use aggregator::{calculated_score, deviation_ratio, display_score, sort_reviewer_scores};
pub use validation::{validate_ai_scores, validate_final_score, validate_manual_scores};
pub use weights::{weight_for, REQUIRED_REVIEWER_ROLES, REVIEWER_WEIGHTS};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ReviewerRole, ScoreRecordId, UserId};
use super::indicators::IndicatorKey;

/// One reviewer's score for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub indicator: IndicatorKey,
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

/// Immutable manual score submitted by a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualScore {
    pub id: ScoreRecordId,
    pub reviewer_id: UserId,
    pub reviewer_name: String,
    pub reviewer_role: ReviewerRole,
    pub weight: f64,
    pub scores: Vec<IndicatorScore>,
    pub submitted_at: DateTime<Utc>,
}

impl ManualScore {
    pub fn score_sum(&self) -> f64 {
        self.scores.iter().map(|entry| entry.score).sum()
    }
}

/// AI model output for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiIndicatorScore {
    pub indicator: IndicatorKey,
    pub score: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Result delivered by the asynchronous AI scoring job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScoreSubmission {
    pub total_score: f64,
    pub indicator_scores: Vec<AiIndicatorScore>,
    /// Attachment counts parsed for count-sensitive indicators.
    #[serde(default)]
    pub parsed_counts: BTreeMap<IndicatorKey, u32>,
}

/// Stored AI score. Informational only; never weighted into the calculated score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScore {
    pub id: ScoreRecordId,
    pub total_score: f64,
    pub indicator_scores: Vec<AiIndicatorScore>,
    pub parsed_counts: BTreeMap<IndicatorKey, u32>,
    pub scored_at: DateTime<Utc>,
}

/// Operator request closing the scoring phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScoreRequest {
    pub final_score: f64,
    pub summary: String,
}

/// Immutable final score; its presence freezes further manual scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub id: ScoreRecordId,
    /// Value exactly as submitted by the operator.
    pub final_score: f64,
    pub summary: String,
    pub determined_by: UserId,
    pub determined_at: DateTime<Utc>,
    /// Weighted average at the time of determination, kept for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_reference: Option<f64>,
}
