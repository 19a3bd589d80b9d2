use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::anomaly::Anomaly;
use super::domain::{
    ApprovalStatus, Evaluation, EvaluationId, EvaluationStatus, OfficeId, RevisionRequest, UserId,
};
use super::operations::OperationLog;
use super::scoring::{AiScore, FinalScore, ManualScore};

/// President office decision on a batch of finalized evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject { reason: String },
}

impl ApprovalDecision {
    pub const fn status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject { .. } => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub approval_id: String,
    pub decision: ApprovalDecision,
    pub decided_by: UserId,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub publication_id: String,
    pub published_by: UserId,
    pub published_at: DateTime<Utc>,
}

/// Repository record: the evaluation plus every scoring artefact attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluation: Evaluation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<AiScore>,
    #[serde(default)]
    pub manual_scores: Vec<ManualScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<FinalScore>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication: Option<PublicationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_request: Option<RevisionRequest>,
    /// Append-only trail of every mutation applied through the service.
    #[serde(default)]
    pub operations: Vec<OperationLog>,
    /// Optimistic concurrency token, bumped by the repository on every update.
    #[serde(default)]
    pub version: u64,
}

impl EvaluationRecord {
    pub fn new(evaluation: Evaluation) -> Self {
        Self {
            evaluation,
            ai_score: None,
            manual_scores: Vec::new(),
            final_score: None,
            anomalies: Vec::new(),
            approval: None,
            publication: None,
            revision_request: None,
            operations: Vec::new(),
            version: 0,
        }
    }

    pub fn id(&self) -> &EvaluationId {
        &self.evaluation.id
    }

    pub fn approval_status(&self) -> ApprovalStatus {
        self.approval
            .as_ref()
            .map(|approval| approval.decision.status())
            .unwrap_or(ApprovalStatus::Pending)
    }

    pub fn pending_anomalies(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|anomaly| anomaly.is_pending())
            .count()
    }

    pub fn status_view(&self) -> EvaluationStatusView {
        EvaluationStatusView {
            evaluation_id: self.evaluation.id.clone(),
            office_id: self.evaluation.office_id.clone(),
            evaluation_year: self.evaluation.evaluation_year,
            status: self.evaluation.status.label(),
            approval_status: self.approval_status().label(),
            manual_score_count: self.manual_scores.len(),
            pending_anomalies: self.pending_anomalies(),
            final_score: self.final_score.as_ref().map(|score| score.final_score),
            revision_reason: self
                .revision_request
                .as_ref()
                .map(|request| request.reason.clone()),
        }
    }
}

/// Sanitized representation of an evaluation's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStatusView {
    pub evaluation_id: EvaluationId,
    pub office_id: OfficeId,
    pub evaluation_year: i32,
    pub status: &'static str,
    pub approval_status: &'static str,
    pub manual_score_count: usize,
    pub pending_anomalies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_reason: Option<String>,
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `update` and `update_batch` compare the record's `version` with the stored one and fail
/// with [`RepositoryError::Conflict`] when they differ. `update_batch` writes all or nothing.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn update(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn update_batch(
        &self,
        records: Vec<EvaluationRecord>,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError>;
    fn find_by_office(
        &self,
        office_id: &OfficeId,
        evaluation_year: i32,
    ) -> Result<Option<EvaluationRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or is stale")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notices: AI scoring requests, returns to offices, approval and publication fan-out.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: WorkflowNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNotice {
    pub template: String,
    pub evaluation_ids: Vec<EvaluationId>,
    pub details: BTreeMap<String, String>,
}

impl WorkflowNotice {
    pub fn new(template: &str, evaluation_ids: Vec<EvaluationId>) -> Self {
        Self {
            template: template.to_string(),
            evaluation_ids,
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}

/// Process-local repository used by the CLI demo, the dev server, and tests.
#[derive(Default, Clone)]
pub struct InMemoryEvaluationRepository {
    records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl InMemoryEvaluationRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<EvaluationId, EvaluationRecord>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    fn check_version(
        stored: &HashMap<EvaluationId, EvaluationRecord>,
        record: &EvaluationRecord,
    ) -> Result<(), RepositoryError> {
        match stored.get(record.id()) {
            Some(current) if current.version == record.version => Ok(()),
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(&self, mut record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let duplicate_office_year = guard.values().any(|existing| {
            existing.evaluation.office_id == record.evaluation.office_id
                && existing.evaluation.evaluation_year == record.evaluation.evaluation_year
        });
        if guard.contains_key(record.id()) || duplicate_office_year {
            return Err(RepositoryError::Conflict);
        }
        record.version = 1;
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn update(&self, mut record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        Self::check_version(&guard, &record)?;
        record.version += 1;
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn update_batch(
        &self,
        records: Vec<EvaluationRecord>,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let mut guard = self.lock()?;
        for record in &records {
            Self::check_version(&guard, record)?;
        }

        let mut stored = Vec::with_capacity(records.len());
        for mut record in records {
            record.version += 1;
            guard.insert(record.id().clone(), record.clone());
            stored.push(record);
        }
        Ok(stored)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn find_by_office(
        &self,
        office_id: &OfficeId,
        evaluation_year: i32,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .values()
            .find(|record| {
                &record.evaluation.office_id == office_id
                    && record.evaluation.evaluation_year == evaluation_year
            })
            .cloned())
    }

    fn list(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(records)
    }
}

/// Notice sink that keeps everything it receives.
#[derive(Default, Clone)]
pub struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<WorkflowNotice>>>,
}

impl InMemoryNotificationPublisher {
    pub fn events(&self) -> Vec<WorkflowNotice> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notice: WorkflowNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .map_err(|_| NoticeError::Transport("notice mutex poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

/// Evaluation counts per lifecycle status.
pub fn status_breakdown(records: &[EvaluationRecord]) -> BTreeMap<EvaluationStatus, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.evaluation.status).or_insert(0) += 1;
    }
    counts
}
