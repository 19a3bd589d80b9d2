use serde::Serialize;

use super::anomaly::AnomalyError;
use super::domain::{AnomalyId, ApprovalStatus, EvaluationId, EvaluationStatus, ReviewerRole, UserRole};
use super::indicators::IndicatorKey;
use super::repository::{NoticeError, RepositoryError};
use super::workflow::{TransitionError, WorkflowAction};

/// Input problems caught before any repository call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one indicator score is required")]
    EmptyScores,
    #[error("indicator {0} is scored more than once")]
    DuplicateIndicator(IndicatorKey),
    #[error("score for {indicator} must be a finite, non-negative number (found {score})")]
    InvalidScore { indicator: IndicatorKey, score: f64 },
    #[error("indicator scores total {total:.2}, above the catalogue maximum of {maximum:.0}")]
    TotalExceedsMaximum { total: f64, maximum: f64 },
    #[error("AI total score {total} is outside [0, {maximum:.0}]")]
    AiTotalOutOfRange { total: f64, maximum: f64 },
    #[error("final score {value} is outside [0, {maximum:.0}]")]
    FinalScoreOutOfRange { value: f64, maximum: f64 },
    #[error("a summary is required when determining the final score")]
    MissingSummary,
    #[error("a reason is required when rejecting")]
    MissingReason,
    #[error("a note is required when correcting an anomaly")]
    MissingCorrectionNote,
    #[error("at least one evaluation id is required")]
    EmptyBatch,
    #[error("evaluation year {0} is out of range")]
    InvalidYear(i32),
}

/// Workflow requirements that are not met yet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionError {
    #[error("cannot {action} while evaluation is {status}: {requirement}")]
    WrongStatus {
        action: WorkflowAction,
        status: EvaluationStatus,
        requirement: &'static str,
    },
    #[error("final score requires manual scores from: {}", join_roles(.missing))]
    MissingReviewerRoles { missing: Vec<ReviewerRole> },
    #[error("publication requires president office approval (approval is {status})")]
    ApprovalRequired { status: ApprovalStatus },
    #[error("evaluation was returned to its office and awaits resubmission: {reason}")]
    RevisionPending { reason: String },
}

fn join_roles(roles: &[ReviewerRole]) -> String {
    roles
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error raised by evaluation operations.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("{role} may not {action}")]
    Forbidden {
        role: UserRole,
        action: WorkflowAction,
    },
    #[error("evaluation belongs to another teaching office")]
    ForeignOffice,
    #[error("evaluation {0} not found")]
    NotFound(EvaluationId),
    #[error("anomaly {0} not found")]
    AnomalyNotFound(AnomalyId),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Coarse classification reported to callers alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    ConflictError,
    PreconditionError,
    TransportError,
    Forbidden,
    NotFound,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::ConflictError => "conflict_error",
            Self::PreconditionError => "precondition_error",
            Self::TransportError => "transport_error",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
        }
    }
}

impl EvaluationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluationError::Validation(_) => ErrorKind::ValidationError,
            EvaluationError::Conflict(_) => ErrorKind::ConflictError,
            EvaluationError::Precondition(_) => ErrorKind::PreconditionError,
            EvaluationError::Forbidden { .. } | EvaluationError::ForeignOffice => {
                ErrorKind::Forbidden
            }
            EvaluationError::NotFound(_) | EvaluationError::AnomalyNotFound(_) => {
                ErrorKind::NotFound
            }
            EvaluationError::Transport(_) => ErrorKind::TransportError,
        }
    }
}

impl From<TransitionError> for EvaluationError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::Precondition {
                action,
                status,
                requirement,
            } => EvaluationError::Precondition(PreconditionError::WrongStatus {
                action,
                status,
                requirement,
            }),
            conflict @ TransitionError::Conflict { .. } => {
                EvaluationError::Conflict(conflict.to_string())
            }
        }
    }
}

impl From<RepositoryError> for EvaluationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => EvaluationError::Conflict(
                "evaluation record already exists or was modified concurrently".to_string(),
            ),
            RepositoryError::NotFound => {
                EvaluationError::Conflict("evaluation record no longer exists".to_string())
            }
            RepositoryError::Unavailable(reason) => EvaluationError::Transport(reason),
        }
    }
}

impl From<NoticeError> for EvaluationError {
    fn from(value: NoticeError) -> Self {
        EvaluationError::Transport(value.to_string())
    }
}

impl From<AnomalyError> for EvaluationError {
    fn from(value: AnomalyError) -> Self {
        match value {
            AnomalyError::Invalid(error) => EvaluationError::Validation(error),
            already @ AnomalyError::AlreadyHandled { .. } => {
                EvaluationError::Conflict(already.to_string())
            }
        }
    }
}
