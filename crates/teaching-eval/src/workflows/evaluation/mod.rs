//! Annual teaching office evaluation: self-evaluation intake, AI and manual scoring,
//! anomaly review, final score determination, approval, and publication.
//!
//! The service owns the workflow rules; the router is a thin JSON layer over it. Storage and
//! outbound notices sit behind [`EvaluationRepository`] and [`NotificationPublisher`] so the
//! whole lifecycle can run in memory.

pub mod anomaly;
pub mod audit;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod operations;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use anomaly::{Anomaly, AnomalyKind, AnomalyResolution, AnomalyStatus, HandledAction};
pub use audit::{collect_audit, write_audit_csv, AuditFilter, ScoreType, ScoringAuditRecord};
pub use domain::{
    ActorContext, AnomalyId, ApprovalStatus, EvaluationId, EvaluationStatus, OfficeId,
    ReviewerRole, SelfEvaluationContent, SelfEvaluationDraft, UserId, UserRole,
};
pub use error::{ErrorKind, EvaluationError, PreconditionError, ValidationError};
pub use indicators::{IndicatorCatalogue, IndicatorKey};
pub use operations::{collect_operations, OperationFilter, OperationLog, OperationType};
pub use repository::{
    status_breakdown, ApprovalDecision, EvaluationRecord, EvaluationRepository,
    EvaluationStatusView, InMemoryEvaluationRepository, InMemoryNotificationPublisher,
    NoticeError, NotificationPublisher, RepositoryError, WorkflowNotice,
};
pub use router::evaluation_router;
pub use scoring::{
    AiIndicatorScore, AiScore, AiScoreSubmission, FinalScore, FinalScoreRequest, IndicatorScore,
    ManualScore,
};
pub use service::{
    ApprovalReceipt, ApprovalRequest, EvaluationService, PublicationReceipt, PublicationRequest,
    ScoreBoard, ScoringPolicy,
};
pub use workflow::{can_transition, WorkflowAction};
