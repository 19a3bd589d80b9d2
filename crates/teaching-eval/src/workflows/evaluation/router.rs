use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::anomaly::{AnomalyResolution, AnomalyStatus};
use super::audit::{write_audit_csv, AuditFilter};
use super::domain::{ActorContext, AnomalyId, EvaluationId, SelfEvaluationDraft};
use super::error::{ErrorKind, EvaluationError};
use super::operations::OperationFilter;
use super::repository::{ApprovalDecision, EvaluationRepository, NotificationPublisher};
use super::scoring::{AiScoreSubmission, FinalScoreRequest, IndicatorScore};
use super::service::{ApprovalRequest, EvaluationService, PublicationRequest};

type SharedService<R, N> = Arc<EvaluationService<R, N>>;

/// Router builder exposing the evaluation lifecycle over JSON.
pub fn evaluation_router<R, N>(service: SharedService<R, N>) -> Router
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/evaluations", post(save_draft_handler::<R, N>))
        .route(
            "/api/v1/evaluations/:evaluation_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/submit",
            post(submit_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/ai-scoring",
            post(trigger_ai_handler::<R, N>),
        )
        // Scoring job callback. It carries no actor; keep it off the public listener.
        .route(
            "/api/v1/evaluations/:evaluation_id/ai-score",
            post(ai_score_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/manual-scores",
            post(manual_score_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/scores",
            get(score_board_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/final-score",
            post(final_score_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/anomalies",
            get(anomalies_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/anomalies/:anomaly_id/handle",
            post(handle_anomaly_handler::<R, N>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/operations",
            get(evaluation_operations_handler::<R, N>),
        )
        .route("/api/v1/approvals", post(approval_handler::<R, N>))
        .route("/api/v1/publications", post(publication_handler::<R, N>))
        .route("/api/v1/scoring/audit", get(audit_handler::<R, N>))
        .route("/api/v1/scoring/audit.csv", get(audit_csv_handler::<R, N>))
        .route("/api/v1/operations", get(operation_log_handler::<R, N>))
        .with_state(service)
}

impl IntoResponse for EvaluationError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ConflictError => StatusCode::CONFLICT,
            ErrorKind::PreconditionError => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::TransportError => {
                warn!(error = %self, "evaluation request failed on a downstream dependency");
                StatusCode::BAD_GATEWAY
            }
        };

        let payload = json!({
            "error": self.to_string(),
            "kind": kind.label(),
        });
        (status, axum::Json(payload)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorEnvelope {
    pub actor: ActorContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveDraftEnvelope {
    pub actor: ActorContext,
    #[serde(flatten)]
    pub draft: SelfEvaluationDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManualScoreEnvelope {
    pub actor: ActorContext,
    pub scores: Vec<IndicatorScore>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinalScoreEnvelope {
    pub actor: ActorContext,
    pub final_score: f64,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HandleAnomalyEnvelope {
    pub actor: ActorContext,
    pub resolution: AnomalyResolution,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApprovalEnvelope {
    pub actor: ActorContext,
    pub evaluation_ids: Vec<EvaluationId>,
    #[serde(flatten)]
    pub decision: ApprovalDecision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublicationEnvelope {
    pub actor: ActorContext,
    pub evaluation_ids: Vec<EvaluationId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnomalyQuery {
    #[serde(default)]
    pub status: Option<AnomalyStatus>,
}

pub(crate) async fn save_draft_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    axum::Json(envelope): axum::Json<SaveDraftEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.save_draft(&envelope.actor, envelope.draft) {
        Ok(record) => {
            let status = if record.version == 1 {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(record.status_view())).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.get(&EvaluationId(evaluation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
    axum::Json(envelope): axum::Json<ActorEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit(&envelope.actor, &EvaluationId(evaluation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn trigger_ai_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
    axum::Json(envelope): axum::Json<ActorEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.trigger_ai_scoring(&envelope.actor, &EvaluationId(evaluation_id)) {
        Ok(ticket) => (StatusCode::ACCEPTED, axum::Json(ticket)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Callback used by the AI scoring job once it has a result.
///
/// This is the job's trust boundary, not a user endpoint: the body carries no actor and the
/// service records the operation without an operator. Deployments expose it only to the
/// scoring job.
pub(crate) async fn ai_score_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
    axum::Json(submission): axum::Json<AiScoreSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.record_ai_score(&EvaluationId(evaluation_id), submission) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn manual_score_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
    axum::Json(envelope): axum::Json<ManualScoreEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit_manual_score(
        &envelope.actor,
        &EvaluationId(evaluation_id),
        envelope.scores,
    ) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn score_board_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.score_board(&EvaluationId(evaluation_id)) {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn final_score_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
    axum::Json(envelope): axum::Json<FinalScoreEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let request = FinalScoreRequest {
        final_score: envelope.final_score,
        summary: envelope.summary,
    };
    match service.determine_final(&envelope.actor, &EvaluationId(evaluation_id), request) {
        Ok(final_score) => (StatusCode::CREATED, axum::Json(final_score)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn anomalies_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
    Query(query): Query<AnomalyQuery>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.anomalies(&EvaluationId(evaluation_id), query.status) {
        Ok(anomalies) => (StatusCode::OK, axum::Json(anomalies)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn handle_anomaly_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path((evaluation_id, anomaly_id)): Path<(String, String)>,
    axum::Json(envelope): axum::Json<HandleAnomalyEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.handle_anomaly(
        &envelope.actor,
        &EvaluationId(evaluation_id),
        &AnomalyId(anomaly_id),
        envelope.resolution,
    ) {
        Ok(anomaly) => (StatusCode::OK, axum::Json(anomaly)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn approval_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    axum::Json(envelope): axum::Json<ApprovalEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let request = ApprovalRequest {
        evaluation_ids: envelope.evaluation_ids,
        decision: envelope.decision,
    };
    match service.decide_approval(&envelope.actor, request) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn publication_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    axum::Json(envelope): axum::Json<PublicationEnvelope>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let request = PublicationRequest {
        evaluation_ids: envelope.evaluation_ids,
    };
    match service.publish(&envelope.actor, request) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn audit_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Query(filter): Query<AuditFilter>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.audit(&filter) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn audit_csv_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Query(filter): Query<AuditFilter>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let entries = match service.audit(&filter) {
        Ok(entries) => entries,
        Err(error) => return error.into_response(),
    };

    let mut buffer = Vec::new();
    match write_audit_csv(&entries, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            buffer,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({
                "error": format!("failed to render audit export: {error}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn evaluation_operations_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.operations(&EvaluationId(evaluation_id)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn operation_log_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Query(filter): Query<OperationFilter>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.operation_log(&filter) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}
