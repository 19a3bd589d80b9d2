//! Forward-only lifecycle of an evaluation.
//!
//! [`can_transition`] answers the status-only question. [`check_action`] adds the
//! record-level preconditions (reviewer coverage, approval, existing final score, an open
//! revision request) and is what the service consults before mutating anything.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{ApprovalStatus, EvaluationStatus, ReviewerRole, UserRole};
use super::error::{EvaluationError, PreconditionError};
use super::repository::EvaluationRecord;
use super::scoring::{ManualScore, REQUIRED_REVIEWER_ROLES};

/// External actions that move (or are checked against) the evaluation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    SaveDraft,
    Submit,
    TriggerAiScoring,
    SubmitManualScore,
    MarkReadyForFinal,
    HandleAnomaly,
    DetermineFinal,
    Approve,
    Publish,
}

impl WorkflowAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SaveDraft => "save_draft",
            Self::Submit => "submit",
            Self::TriggerAiScoring => "trigger_ai_scoring",
            Self::SubmitManualScore => "submit_manual_score",
            Self::MarkReadyForFinal => "mark_ready_for_final",
            Self::HandleAnomaly => "handle_anomaly",
            Self::DetermineFinal => "determine_final",
            Self::Approve => "approve",
            Self::Publish => "publish",
        }
    }

    /// Whether a user holding `role` may request this action at all.
    pub const fn permitted_for(self, role: UserRole) -> bool {
        match self {
            Self::SaveDraft | Self::Submit => matches!(role, UserRole::TeachingOffice),
            Self::TriggerAiScoring | Self::SubmitManualScore | Self::HandleAnomaly => {
                matches!(role, UserRole::EvaluationTeam | UserRole::EvaluationOffice)
            }
            Self::MarkReadyForFinal | Self::DetermineFinal | Self::Publish => {
                matches!(role, UserRole::EvaluationOffice)
            }
            Self::Approve => matches!(role, UserRole::PresidentOffice),
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {action} while evaluation is {status}: {requirement}")]
    Precondition {
        action: WorkflowAction,
        status: EvaluationStatus,
        requirement: &'static str,
    },
    #[error("cannot {action} while evaluation is {status}: {reason}")]
    Conflict {
        action: WorkflowAction,
        status: EvaluationStatus,
        reason: &'static str,
    },
}

/// Status reached by applying `action` in status `from`.
pub fn can_transition(
    from: EvaluationStatus,
    action: WorkflowAction,
) -> Result<EvaluationStatus, TransitionError> {
    use EvaluationStatus::*;

    let precondition = |requirement| TransitionError::Precondition {
        action,
        status: from,
        requirement,
    };
    let conflict = |reason| TransitionError::Conflict {
        action,
        status: from,
        reason,
    };

    match action {
        WorkflowAction::SaveDraft => match from {
            Draft | Submitted => Ok(from),
            _ => Err(conflict("self-evaluation is locked")),
        },
        WorkflowAction::Submit => match from {
            Draft | Submitted => Ok(Locked),
            _ => Err(conflict("self-evaluation was already submitted")),
        },
        WorkflowAction::TriggerAiScoring => match from {
            Locked => Ok(AiScored),
            Draft | Submitted => Err(precondition("self-evaluation must be submitted first")),
            _ => Err(conflict("AI scoring already completed")),
        },
        WorkflowAction::SubmitManualScore => match from {
            AiScored | ManuallyScored => Ok(ManuallyScored),
            ReadyForFinal => Ok(ReadyForFinal),
            Draft | Submitted | Locked => Err(precondition("AI scoring must complete first")),
            Finalized | Published => Err(conflict("final score already determined")),
        },
        WorkflowAction::MarkReadyForFinal => match from {
            ManuallyScored => Ok(ReadyForFinal),
            Draft | Submitted | Locked | AiScored => {
                Err(precondition("manual scoring has not started"))
            }
            ReadyForFinal | Finalized | Published => {
                Err(conflict("evaluation is already eligible for final scoring"))
            }
        },
        WorkflowAction::HandleAnomaly => match from {
            AiScored | ManuallyScored | ReadyForFinal => Ok(from),
            Draft | Submitted | Locked => Err(precondition("AI scoring must complete first")),
            Finalized | Published => Err(conflict("scoring is closed")),
        },
        WorkflowAction::DetermineFinal => match from {
            ReadyForFinal => Ok(Finalized),
            Finalized | Published => Err(conflict("final score already determined")),
            _ => Err(precondition(
                "both reviewer roles must score before the final score",
            )),
        },
        WorkflowAction::Approve => match from {
            Finalized => Ok(Finalized),
            Published => Err(conflict("results are already published")),
            _ => Err(precondition("final score must be determined first")),
        },
        WorkflowAction::Publish => match from {
            Finalized => Ok(Published),
            Published => Err(conflict("results are already published")),
            _ => Err(precondition("final score must be determined and approved first")),
        },
    }
}

/// Which mandatory reviewer roles have scored an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewerCoverage {
    present: BTreeSet<ReviewerRole>,
}

impl ReviewerCoverage {
    pub fn from_scores(scores: &[ManualScore]) -> Self {
        Self {
            present: scores.iter().map(|score| score.reviewer_role).collect(),
        }
    }

    pub fn missing(&self) -> Vec<ReviewerRole> {
        REQUIRED_REVIEWER_ROLES
            .iter()
            .copied()
            .filter(|role| !self.present.contains(role))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Status-level and record-level checks for `action` on `record`.
pub fn check_action(
    record: &EvaluationRecord,
    action: WorkflowAction,
) -> Result<EvaluationStatus, EvaluationError> {
    let status = record.evaluation.status;

    match action {
        WorkflowAction::SubmitManualScore | WorkflowAction::DetermineFinal
            if record.final_score.is_some() =>
        {
            return Err(TransitionError::Conflict {
                action,
                status,
                reason: "final score already determined",
            }
            .into());
        }
        // A returned evaluation reopens for its office without moving the status back.
        WorkflowAction::SaveDraft | WorkflowAction::Submit
            if record.revision_request.is_some() =>
        {
            return Ok(status);
        }
        WorkflowAction::TriggerAiScoring if record.ai_score.is_some() => {
            return Err(TransitionError::Conflict {
                action,
                status,
                reason: "AI scoring already completed",
            }
            .into());
        }
        _ => {}
    }

    let next = can_transition(status, action)?;

    match action {
        WorkflowAction::MarkReadyForFinal | WorkflowAction::DetermineFinal => {
            if let (WorkflowAction::DetermineFinal, Some(revision)) =
                (action, &record.revision_request)
            {
                return Err(PreconditionError::RevisionPending {
                    reason: revision.reason.clone(),
                }
                .into());
            }
            let missing = ReviewerCoverage::from_scores(&record.manual_scores).missing();
            if !missing.is_empty() {
                return Err(PreconditionError::MissingReviewerRoles { missing }.into());
            }
        }
        WorkflowAction::Approve if record.approval_status() == ApprovalStatus::Approved => {
            return Err(EvaluationError::Conflict(
                "results are already approved".to_string(),
            ));
        }
        WorkflowAction::Publish => {
            let approval = record.approval_status();
            if approval != ApprovalStatus::Approved {
                return Err(PreconditionError::ApprovalRequired { status: approval }.into());
            }
        }
        _ => {}
    }

    Ok(next)
}

/// True when a final score may be determined right now.
pub fn can_submit_final(record: &EvaluationRecord) -> bool {
    check_action(record, WorkflowAction::DetermineFinal).is_ok()
}
