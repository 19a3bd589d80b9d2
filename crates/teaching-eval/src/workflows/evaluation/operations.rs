use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ActorContext, EvaluationId, UserId, UserRole};
use super::repository::EvaluationRecord;

/// State-changing actions captured in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    SaveDraft,
    Submit,
    AiScoringRequested,
    AiScoreRecorded,
    ManualScore,
    FinalScore,
    HandleAnomaly,
    ApprovalDecision,
    Publish,
}

impl OperationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SaveDraft => "save_draft",
            Self::Submit => "submit",
            Self::AiScoringRequested => "ai_scoring_requested",
            Self::AiScoreRecorded => "ai_score_recorded",
            Self::ManualScore => "manual_score",
            Self::FinalScore => "final_score",
            Self::HandleAnomaly => "handle_anomaly",
            Self::ApprovalDecision => "approval_decision",
            Self::Publish => "publish",
        }
    }
}

/// Append-only entry written alongside every mutation of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
    pub id: String,
    pub evaluation_id: EvaluationId,
    pub operation_type: OperationType,
    /// Absent for the AI job callback, which carries no user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_role: Option<UserRole>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    pub operated_at: DateTime<Utc>,
}

impl OperationLog {
    pub fn new(
        id: String,
        evaluation_id: EvaluationId,
        operation_type: OperationType,
        operator: Option<&ActorContext>,
        operated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            evaluation_id,
            operation_type,
            operator_id: operator.map(|actor| actor.user_id.clone()),
            operator_name: operator.map(|actor| actor.name.clone()),
            operator_role: operator.map(|actor| actor.role),
            details: BTreeMap::new(),
            operated_at,
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OperationFilter {
    #[serde(default)]
    pub operation_type: Option<OperationType>,
    #[serde(default)]
    pub operator_id: Option<UserId>,
    #[serde(default)]
    pub evaluation_id: Option<EvaluationId>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl OperationFilter {
    fn admits(&self, entry: &OperationLog) -> bool {
        if let Some(kind) = self.operation_type {
            if entry.operation_type != kind {
                return false;
            }
        }
        if let Some(operator) = &self.operator_id {
            if entry.operator_id.as_ref() != Some(operator) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.operated_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.operated_at > end {
                return false;
            }
        }
        true
    }
}

/// Every logged operation across `records` that passes `filter`, newest first.
pub fn collect_operations(
    records: &[EvaluationRecord],
    filter: &OperationFilter,
) -> Vec<OperationLog> {
    let mut entries: Vec<OperationLog> = records
        .iter()
        .filter(|record| {
            filter
                .evaluation_id
                .as_ref()
                .map_or(true, |wanted| record.id() == wanted)
        })
        .flat_map(|record| record.operations.iter())
        .filter(|entry| filter.admits(entry))
        .cloned()
        .collect();

    // Ids are zero-padded and issued in order, so they break timestamp ties.
    entries.sort_by(|left, right| {
        right
            .operated_at
            .cmp(&left.operated_at)
            .then_with(|| right.id.cmp(&left.id))
    });
    entries
}
