use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::indicators::IndicatorKey;

/// Identifier wrapper for evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Teaching office being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfficeId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier shared by AI, manual, and final score records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecordId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnomalyId(pub String);

impl fmt::Display for AnomalyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an evaluation. Variants are declared in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Draft,
    Submitted,
    Locked,
    AiScored,
    ManuallyScored,
    ReadyForFinal,
    Finalized,
    Published,
}

impl EvaluationStatus {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Draft,
            Self::Submitted,
            Self::Locked,
            Self::AiScored,
            Self::ManuallyScored,
            Self::ReadyForFinal,
            Self::Finalized,
            Self::Published,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Locked => "locked",
            Self::AiScored => "ai_scored",
            Self::ManuallyScored => "manually_scored",
            Self::ReadyForFinal => "ready_for_final",
            Self::Finalized => "finalized",
            Self::Published => "published",
        }
    }

    /// Whether the self-evaluation content may still be edited by the office.
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Submitted)
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Approval axis, tracked independently of [`EvaluationStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical user roles. `director` is an older name for the teaching office role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[serde(alias = "director")]
    TeachingOffice,
    EvaluationTeam,
    EvaluationOffice,
    PresidentOffice,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TeachingOffice => "teaching_office",
            Self::EvaluationTeam => "evaluation_team",
            Self::EvaluationOffice => "evaluation_office",
            Self::PresidentOffice => "president_office",
        }
    }

    /// Reviewer role under which a manual score from this user is weighted.
    pub const fn reviewer_role(self) -> Option<ReviewerRole> {
        match self {
            Self::EvaluationTeam => Some(ReviewerRole::EvaluationTeam),
            Self::EvaluationOffice => Some(ReviewerRole::EvaluationOffice),
            Self::TeachingOffice | Self::PresidentOffice => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Roles whose manual scores feed the weighted average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    EvaluationTeam,
    EvaluationOffice,
}

impl ReviewerRole {
    pub const fn ordered() -> [Self; 2] {
        [Self::EvaluationTeam, Self::EvaluationOffice]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EvaluationTeam => "evaluation_team",
            Self::EvaluationOffice => "evaluation_office",
        }
    }

    /// Presentation rank: team rows are listed before office rows.
    pub const fn rank(self) -> u8 {
        match self {
            Self::EvaluationTeam => 0,
            Self::EvaluationOffice => 1,
        }
    }
}

impl fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller identity injected into every service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: UserId,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_id: Option<OfficeId>,
}

/// Self-evaluation form content kept on the evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEvaluationContent {
    /// Counts declared for count-sensitive indicators, e.g. reform projects.
    #[serde(default)]
    pub declared_counts: BTreeMap<IndicatorKey, u32>,
    #[serde(default)]
    pub statements: BTreeMap<IndicatorKey, String>,
}

impl SelfEvaluationContent {
    pub fn declared_count(&self, indicator: IndicatorKey) -> u32 {
        self.declared_counts.get(&indicator).copied().unwrap_or(0)
    }
}

/// Draft payload saved by a teaching office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEvaluationDraft {
    pub office_id: OfficeId,
    pub evaluation_year: i32,
    pub content: SelfEvaluationContent,
}

/// Evaluation header: who is evaluated, for which year, and where it stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub office_id: OfficeId,
    pub evaluation_year: i32,
    pub status: EvaluationStatus,
    pub content: SelfEvaluationContent,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Request attached to an evaluation when an anomaly is rejected back to its office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub anomaly_id: AnomalyId,
    pub reason: String,
    pub requested_by: UserId,
    pub requested_at: DateTime<Utc>,
}
