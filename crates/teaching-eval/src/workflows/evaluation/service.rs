use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::anomaly::{detect_anomalies, Anomaly, AnomalyResolution, AnomalyStatus};
use super::audit::{collect_audit, AuditFilter, ScoringAuditRecord};
use super::domain::{
    ActorContext, AnomalyId, Evaluation, EvaluationId, EvaluationStatus, ReviewerRole,
    RevisionRequest, ScoreRecordId, SelfEvaluationDraft,
};
use super::error::{EvaluationError, ValidationError};
use super::indicators::IndicatorCatalogue;
use super::operations::{collect_operations, OperationFilter, OperationLog, OperationType};
use super::repository::{
    ApprovalDecision, ApprovalRecord, EvaluationRecord, EvaluationRepository,
    NotificationPublisher, PublicationRecord, WorkflowNotice,
};
use super::scoring::{
    calculated_score, deviation_ratio, display_score, sort_reviewer_scores, validate_ai_scores,
    validate_final_score, validate_manual_scores, weight_for, AiScore, AiScoreSubmission,
    FinalScore, FinalScoreRequest, IndicatorScore, ManualScore,
};
use super::workflow::{check_action, can_submit_final, ReviewerCoverage, WorkflowAction};
use crate::config::{ScoringConfig, DEFAULT_DEVIATION_WARNING_RATIO};

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SCORE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ANOMALY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DECISION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static OPERATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
    let id = sequence.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

const MIN_EVALUATION_YEAR: i32 = 2000;
const MAX_EVALUATION_YEAR: i32 = 2100;

/// Policy dial for final-score overrides.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    deviation_warning_ratio: f64,
    catalogue: IndicatorCatalogue,
}

impl ScoringPolicy {
    pub fn new(deviation_warning_ratio: f64) -> Self {
        let sanitized = if deviation_warning_ratio.is_finite() && deviation_warning_ratio >= 0.0 {
            deviation_warning_ratio
        } else {
            DEFAULT_DEVIATION_WARNING_RATIO
        };

        Self {
            deviation_warning_ratio: sanitized,
            catalogue: IndicatorCatalogue::standard(),
        }
    }

    pub fn deviation_warning_ratio(&self) -> f64 {
        self.deviation_warning_ratio
    }

    pub fn catalogue(&self) -> &IndicatorCatalogue {
        &self.catalogue
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DEVIATION_WARNING_RATIO)
    }
}

impl From<&ScoringConfig> for ScoringPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self::new(config.deviation_warning_ratio)
    }
}

/// Everything a reviewer sees before determining the final score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBoard {
    pub evaluation_id: EvaluationId,
    pub status: EvaluationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<AiScore>,
    pub manual_scores: Vec<ManualScore>,
    pub calculated_score: Option<f64>,
    pub calculated_score_display: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<FinalScore>,
    pub can_submit_final: bool,
    pub missing_reviewer_roles: Vec<ReviewerRole>,
    pub total_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualScoreReceipt {
    pub score_record_id: ScoreRecordId,
    pub status: EvaluationStatus,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScoringTicket {
    pub evaluation_id: EvaluationId,
    pub status: EvaluationStatus,
    pub requested: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub evaluation_ids: Vec<EvaluationId>,
    #[serde(flatten)]
    pub decision: ApprovalDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalReceipt {
    pub approval_id: String,
    pub decision: ApprovalDecision,
    pub evaluation_ids: Vec<EvaluationId>,
    /// False when the downstream notice could not be delivered.
    pub notified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRequest {
    pub evaluation_ids: Vec<EvaluationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationReceipt {
    pub publication_id: String,
    pub evaluation_ids: Vec<EvaluationId>,
    pub notified: bool,
}

/// Service composing the workflow rules, score aggregation, repository, and notices.
pub struct EvaluationService<R, N> {
    repository: Arc<R>,
    notices: Arc<N>,
    policy: ScoringPolicy,
}

impl<R, N> EvaluationService<R, N>
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notices: Arc<N>, policy: ScoringPolicy) -> Self {
        Self {
            repository,
            notices,
            policy,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    fn authorize(actor: &ActorContext, action: WorkflowAction) -> Result<(), EvaluationError> {
        if action.permitted_for(actor.role) {
            Ok(())
        } else {
            Err(EvaluationError::Forbidden {
                role: actor.role,
                action,
            })
        }
    }

    fn authorize_owner(actor: &ActorContext, record: &EvaluationRecord) -> Result<(), EvaluationError> {
        if actor.office_id.as_ref() == Some(&record.evaluation.office_id) {
            Ok(())
        } else {
            Err(EvaluationError::ForeignOffice)
        }
    }

    fn operation(
        id: &EvaluationId,
        kind: OperationType,
        operator: Option<&ActorContext>,
    ) -> OperationLog {
        OperationLog::new(
            next_id(&OPERATION_SEQUENCE, "op"),
            id.clone(),
            kind,
            operator,
            Utc::now(),
        )
    }

    fn load(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| EvaluationError::NotFound(id.clone()))
    }

    /// Create the office's evaluation for the year, or update its content while still editable.
    ///
    /// An evaluation returned through a rejected anomaly stays editable until it is resubmitted.
    pub fn save_draft(
        &self,
        actor: &ActorContext,
        draft: SelfEvaluationDraft,
    ) -> Result<EvaluationRecord, EvaluationError> {
        Self::authorize(actor, WorkflowAction::SaveDraft)?;
        if !(MIN_EVALUATION_YEAR..=MAX_EVALUATION_YEAR).contains(&draft.evaluation_year) {
            return Err(ValidationError::InvalidYear(draft.evaluation_year).into());
        }
        if actor.office_id.as_ref() != Some(&draft.office_id) {
            return Err(EvaluationError::ForeignOffice);
        }

        let existing = self
            .repository
            .find_by_office(&draft.office_id, draft.evaluation_year)?;

        let stored = match existing {
            Some(mut record) => {
                check_action(&record, WorkflowAction::SaveDraft)?;
                record.evaluation.content = draft.content;
                let entry = Self::operation(record.id(), OperationType::SaveDraft, Some(actor))
                    .with_detail("revision_open", record.revision_request.is_some().to_string());
                record.operations.push(entry);
                self.repository.update(record)?
            }
            None => {
                let evaluation = Evaluation {
                    id: EvaluationId(next_id(&EVALUATION_SEQUENCE, "eval")),
                    office_id: draft.office_id,
                    evaluation_year: draft.evaluation_year,
                    status: EvaluationStatus::Draft,
                    content: draft.content,
                    created_at: Utc::now(),
                    submitted_at: None,
                };
                let mut record = EvaluationRecord::new(evaluation);
                let entry = Self::operation(record.id(), OperationType::SaveDraft, Some(actor))
                    .with_detail("created", "true");
                record.operations.push(entry);
                self.repository.insert(record)?
            }
        };

        info!(
            evaluation_id = %stored.evaluation.id,
            status = %stored.evaluation.status,
            "self-evaluation saved"
        );
        Ok(stored)
    }

    /// Submit and lock the self-evaluation. Resubmitting a returned evaluation closes its
    /// revision request and keeps the status it had reached.
    pub fn submit(
        &self,
        actor: &ActorContext,
        id: &EvaluationId,
    ) -> Result<EvaluationRecord, EvaluationError> {
        Self::authorize(actor, WorkflowAction::Submit)?;
        let mut record = self.load(id)?;
        Self::authorize_owner(actor, &record)?;

        let next = check_action(&record, WorkflowAction::Submit)?;
        let resubmitted = record.revision_request.take().is_some();
        record.evaluation.status = next;
        record.evaluation.submitted_at = Some(Utc::now());
        let entry = Self::operation(id, OperationType::Submit, Some(actor))
            .with_detail("resubmitted", resubmitted.to_string());
        record.operations.push(entry);
        let stored = self.repository.update(record)?;

        info!(
            evaluation_id = %id,
            status = %next,
            resubmitted,
            "self-evaluation submitted and locked"
        );
        Ok(stored)
    }

    /// Fire-and-forget request for AI scoring; the result arrives via [`Self::record_ai_score`].
    pub fn trigger_ai_scoring(
        &self,
        actor: &ActorContext,
        id: &EvaluationId,
    ) -> Result<AiScoringTicket, EvaluationError> {
        Self::authorize(actor, WorkflowAction::TriggerAiScoring)?;
        let mut record = self.load(id)?;
        check_action(&record, WorkflowAction::TriggerAiScoring)?;

        self.notices.publish(
            WorkflowNotice::new("ai_scoring_requested", vec![id.clone()])
                .with_detail("requested_by", actor.user_id.0.clone()),
        )?;
        let status = record.evaluation.status;
        record
            .operations
            .push(Self::operation(id, OperationType::AiScoringRequested, Some(actor)));
        self.repository.update(record)?;

        info!(evaluation_id = %id, role = %actor.role, "AI scoring requested");
        Ok(AiScoringTicket {
            evaluation_id: id.clone(),
            status,
            requested: true,
        })
    }

    /// Store the AI job result, move to `ai_scored`, and flag count anomalies.
    ///
    /// This is the scoring job's callback and carries no user, so the operation log entry has no
    /// operator. Only the job may reach it.
    pub fn record_ai_score(
        &self,
        id: &EvaluationId,
        submission: AiScoreSubmission,
    ) -> Result<EvaluationRecord, EvaluationError> {
        validate_ai_scores(&submission, self.policy.catalogue())?;
        let mut record = self.load(id)?;
        let next = check_action(&record, WorkflowAction::TriggerAiScoring)?;

        let detected = detect_anomalies(
            &record.evaluation.content,
            &submission.parsed_counts,
            self.policy.catalogue(),
        );
        for found in detected {
            warn!(
                evaluation_id = %id,
                indicator = %found.indicator,
                "{}",
                found.description
            );
            record.anomalies.push(Anomaly {
                id: AnomalyId(next_id(&ANOMALY_SEQUENCE, "anomaly")),
                evaluation_id: id.clone(),
                kind: found.kind,
                indicator: found.indicator,
                declared_count: found.declared_count,
                parsed_count: found.parsed_count,
                description: found.description,
                status: AnomalyStatus::Pending,
                handled_by: None,
                handled_action: None,
                handled_at: None,
                resolution: None,
            });
        }

        record.ai_score = Some(AiScore {
            id: ScoreRecordId(next_id(&SCORE_SEQUENCE, "score")),
            total_score: submission.total_score,
            indicator_scores: submission.indicator_scores,
            parsed_counts: submission.parsed_counts,
            scored_at: Utc::now(),
        });
        record.evaluation.status = next;
        let entry = Self::operation(id, OperationType::AiScoreRecorded, None)
            .with_detail("source", "ai_job")
            .with_detail("anomalies", record.pending_anomalies().to_string());
        record.operations.push(entry);
        let stored = self.repository.update(record)?;

        info!(
            evaluation_id = %id,
            status = %next,
            anomalies = stored.pending_anomalies(),
            "AI score recorded"
        );
        Ok(stored)
    }

    /// Append an immutable manual score for the acting reviewer.
    pub fn submit_manual_score(
        &self,
        actor: &ActorContext,
        id: &EvaluationId,
        scores: Vec<IndicatorScore>,
    ) -> Result<ManualScoreReceipt, EvaluationError> {
        Self::authorize(actor, WorkflowAction::SubmitManualScore)?;
        let reviewer_role = actor.role.reviewer_role().ok_or(EvaluationError::Forbidden {
            role: actor.role,
            action: WorkflowAction::SubmitManualScore,
        })?;
        validate_manual_scores(&scores, self.policy.catalogue())?;

        let mut record = self.load(id)?;
        let mut next = check_action(&record, WorkflowAction::SubmitManualScore)?;

        if record
            .manual_scores
            .iter()
            .any(|existing| existing.reviewer_id == actor.user_id)
        {
            return Err(EvaluationError::Conflict(format!(
                "{} already scored evaluation {id}; manual scores cannot be modified",
                actor.name
            )));
        }

        let weight = weight_for(reviewer_role);
        let score_record_id = ScoreRecordId(next_id(&SCORE_SEQUENCE, "score"));
        record.manual_scores.push(ManualScore {
            id: score_record_id.clone(),
            reviewer_id: actor.user_id.clone(),
            reviewer_name: actor.name.clone(),
            reviewer_role,
            weight,
            scores,
            submitted_at: Utc::now(),
        });
        record.evaluation.status = next;

        if next == EvaluationStatus::ManuallyScored
            && ReviewerCoverage::from_scores(&record.manual_scores).is_complete()
        {
            next = check_action(&record, WorkflowAction::MarkReadyForFinal)?;
            record.evaluation.status = next;
        }

        let entry = Self::operation(id, OperationType::ManualScore, Some(actor))
            .with_detail("score_record_id", score_record_id.0.clone())
            .with_detail("reviewer_role", reviewer_role.to_string());
        record.operations.push(entry);
        self.repository.update(record)?;

        info!(
            evaluation_id = %id,
            reviewer_role = %reviewer_role,
            status = %next,
            "manual score submitted"
        );
        Ok(ManualScoreReceipt {
            score_record_id,
            status: next,
            weight,
        })
    }

    pub fn score_board(&self, id: &EvaluationId) -> Result<ScoreBoard, EvaluationError> {
        let record = self.load(id)?;
        let calculated = calculated_score(&record.manual_scores);
        let can_submit_final = can_submit_final(&record);
        let missing_reviewer_roles = ReviewerCoverage::from_scores(&record.manual_scores).missing();

        Ok(ScoreBoard {
            evaluation_id: record.evaluation.id,
            status: record.evaluation.status,
            ai_score: record.ai_score,
            manual_scores: sort_reviewer_scores(record.manual_scores),
            calculated_score: calculated,
            calculated_score_display: calculated.map(display_score),
            final_score: record.final_score,
            can_submit_final,
            missing_reviewer_roles,
            total_max: self.policy.catalogue().total_max(),
        })
    }

    /// Close the scoring phase with the value the operator submitted.
    pub fn determine_final(
        &self,
        actor: &ActorContext,
        id: &EvaluationId,
        request: FinalScoreRequest,
    ) -> Result<FinalScore, EvaluationError> {
        Self::authorize(actor, WorkflowAction::DetermineFinal)?;
        validate_final_score(&request, self.policy.catalogue())?;

        let mut record = self.load(id)?;
        let next = check_action(&record, WorkflowAction::DetermineFinal)?;

        let calculated = calculated_score(&record.manual_scores);
        if let Some(ratio) = calculated.and_then(|value| deviation_ratio(value, request.final_score))
        {
            if ratio > self.policy.deviation_warning_ratio() {
                warn!(
                    evaluation_id = %id,
                    submitted = request.final_score,
                    calculated = calculated.unwrap_or_default(),
                    ratio,
                    "final score deviates from the calculated score"
                );
            }
        }

        let final_score = FinalScore {
            id: ScoreRecordId(next_id(&SCORE_SEQUENCE, "score")),
            final_score: request.final_score,
            summary: request.summary,
            determined_by: actor.user_id.clone(),
            determined_at: Utc::now(),
            calculated_reference: calculated,
        };
        record.final_score = Some(final_score.clone());
        record.evaluation.status = next;
        let entry = Self::operation(id, OperationType::FinalScore, Some(actor))
            .with_detail("final_score", final_score.final_score.to_string());
        record.operations.push(entry);
        self.repository.update(record)?;

        info!(evaluation_id = %id, status = %next, "final score determined");
        Ok(final_score)
    }

    pub fn anomalies(
        &self,
        id: &EvaluationId,
        status: Option<AnomalyStatus>,
    ) -> Result<Vec<Anomaly>, EvaluationError> {
        let record = self.load(id)?;
        Ok(record
            .anomalies
            .into_iter()
            .filter(|anomaly| status.map_or(true, |wanted| anomaly.status == wanted))
            .collect())
    }

    /// Reject or correct a pending anomaly. Handling is one-shot.
    ///
    /// A rejection returns the evaluation to its office. The return notice goes out before the
    /// record is stored, so a delivery failure leaves the anomaly pending and the call can be
    /// retried.
    pub fn handle_anomaly(
        &self,
        actor: &ActorContext,
        id: &EvaluationId,
        anomaly_id: &AnomalyId,
        resolution: AnomalyResolution,
    ) -> Result<Anomaly, EvaluationError> {
        Self::authorize(actor, WorkflowAction::HandleAnomaly)?;
        resolution.validate()?;

        let mut record = self.load(id)?;
        let position = record
            .anomalies
            .iter()
            .position(|anomaly| &anomaly.id == anomaly_id)
            .ok_or_else(|| EvaluationError::AnomalyNotFound(anomaly_id.clone()))?;
        check_action(&record, WorkflowAction::HandleAnomaly)?;

        let now = Utc::now();
        let anomaly = &mut record.anomalies[position];
        anomaly.handle(resolution.clone(), actor.user_id.clone(), now)?;
        let handled = anomaly.clone();

        let notice = match resolution {
            AnomalyResolution::Reject { reason } => {
                record.revision_request = Some(RevisionRequest {
                    anomaly_id: anomaly_id.clone(),
                    reason: reason.clone(),
                    requested_by: actor.user_id.clone(),
                    requested_at: now,
                });
                Some(
                    WorkflowNotice::new("evaluation_returned", vec![id.clone()])
                        .with_detail("indicator", handled.indicator.key())
                        .with_detail("reason", reason),
                )
            }
            AnomalyResolution::Correct {
                corrected_value, ..
            } => {
                record
                    .evaluation
                    .content
                    .declared_counts
                    .insert(handled.indicator, corrected_value);
                None
            }
        };

        if let Some(notice) = notice {
            self.notices.publish(notice)?;
        }
        let entry = Self::operation(id, OperationType::HandleAnomaly, Some(actor))
            .with_detail("anomaly_id", anomaly_id.0.clone())
            .with_detail(
                "action",
                handled
                    .handled_action
                    .map(|action| action.label())
                    .unwrap_or_default(),
            );
        record.operations.push(entry);
        self.repository.update(record)?;

        info!(
            evaluation_id = %id,
            anomaly_id = %anomaly_id,
            action = handled.handled_action.map(|action| action.label()).unwrap_or_default(),
            "anomaly handled"
        );
        Ok(handled)
    }

    /// Record the president office decision for a batch of finalized evaluations.
    pub fn decide_approval(
        &self,
        actor: &ActorContext,
        request: ApprovalRequest,
    ) -> Result<ApprovalReceipt, EvaluationError> {
        Self::authorize(actor, WorkflowAction::Approve)?;
        if request.evaluation_ids.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        if let ApprovalDecision::Reject { reason } = &request.decision {
            if reason.trim().is_empty() {
                return Err(ValidationError::MissingReason.into());
            }
        }

        let mut records = Vec::with_capacity(request.evaluation_ids.len());
        for id in &request.evaluation_ids {
            let record = self.load(id)?;
            check_action(&record, WorkflowAction::Approve)?;
            records.push(record);
        }

        let approval = ApprovalRecord {
            approval_id: next_id(&DECISION_SEQUENCE, "approval"),
            decision: request.decision.clone(),
            decided_by: actor.user_id.clone(),
            decided_at: Utc::now(),
        };
        let decision_label = match request.decision {
            ApprovalDecision::Approve => "approve",
            ApprovalDecision::Reject { .. } => "reject",
        };
        for record in &mut records {
            record.approval = Some(approval.clone());
            let entry = Self::operation(record.id(), OperationType::ApprovalDecision, Some(actor))
                .with_detail("approval_id", approval.approval_id.clone())
                .with_detail("decision", decision_label);
            record.operations.push(entry);
        }
        self.repository.update_batch(records)?;

        let template = match request.decision {
            ApprovalDecision::Approve => "results_approved",
            ApprovalDecision::Reject { .. } => "results_rejected",
        };
        let mut notice = WorkflowNotice::new(template, request.evaluation_ids.clone())
            .with_detail("approval_id", approval.approval_id.clone());
        if let ApprovalDecision::Reject { reason } = &request.decision {
            notice = notice.with_detail("reason", reason.clone());
        }
        let notified = self.publish_best_effort(notice);

        info!(
            approval_id = %approval.approval_id,
            evaluations = request.evaluation_ids.len(),
            decision = template,
            "approval decision recorded"
        );
        Ok(ApprovalReceipt {
            approval_id: approval.approval_id,
            decision: request.decision,
            evaluation_ids: request.evaluation_ids,
            notified,
        })
    }

    /// Publish a batch of approved results.
    pub fn publish(
        &self,
        actor: &ActorContext,
        request: PublicationRequest,
    ) -> Result<PublicationReceipt, EvaluationError> {
        Self::authorize(actor, WorkflowAction::Publish)?;
        if request.evaluation_ids.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        let publication = PublicationRecord {
            publication_id: next_id(&DECISION_SEQUENCE, "publication"),
            published_by: actor.user_id.clone(),
            published_at: Utc::now(),
        };

        let mut records = Vec::with_capacity(request.evaluation_ids.len());
        for id in &request.evaluation_ids {
            let mut record = self.load(id)?;
            let next = check_action(&record, WorkflowAction::Publish)?;
            record.evaluation.status = next;
            record.publication = Some(publication.clone());
            record.operations.push(
                Self::operation(id, OperationType::Publish, Some(actor))
                    .with_detail("publication_id", publication.publication_id.clone()),
            );
            records.push(record);
        }
        self.repository.update_batch(records)?;

        let notified = self.publish_best_effort(
            WorkflowNotice::new("results_published", request.evaluation_ids.clone())
                .with_detail("publication_id", publication.publication_id.clone()),
        );

        info!(
            publication_id = %publication.publication_id,
            evaluations = request.evaluation_ids.len(),
            "results published"
        );
        Ok(PublicationReceipt {
            publication_id: publication.publication_id,
            evaluation_ids: request.evaluation_ids,
            notified,
        })
    }

    fn publish_best_effort(&self, notice: WorkflowNotice) -> bool {
        let template = notice.template.clone();
        match self.notices.publish(notice) {
            Ok(()) => true,
            Err(error) => {
                warn!(%template, %error, "notice delivery failed");
                false
            }
        }
    }

    /// Fetch an evaluation record for API responses.
    pub fn get(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationError> {
        self.load(id)
    }

    pub fn audit(&self, filter: &AuditFilter) -> Result<Vec<ScoringAuditRecord>, EvaluationError> {
        let records = self.repository.list()?;
        Ok(collect_audit(&records, filter))
    }

    /// Operation log of one evaluation, newest first.
    pub fn operations(&self, id: &EvaluationId) -> Result<Vec<OperationLog>, EvaluationError> {
        let record = self.load(id)?;
        let filter = OperationFilter {
            evaluation_id: Some(id.clone()),
            ..OperationFilter::default()
        };
        Ok(collect_operations(&[record], &filter))
    }

    pub fn operation_log(
        &self,
        filter: &OperationFilter,
    ) -> Result<Vec<OperationLog>, EvaluationError> {
        let records = self.repository.list()?;
        Ok(collect_operations(&records, filter))
    }
}
