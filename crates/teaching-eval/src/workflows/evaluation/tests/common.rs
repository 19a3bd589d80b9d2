use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::evaluation::domain::{
    ActorContext, EvaluationId, OfficeId, ReviewerRole, ScoreRecordId, SelfEvaluationContent,
    SelfEvaluationDraft, UserId, UserRole,
};
use crate::workflows::evaluation::indicators::IndicatorKey;
use crate::workflows::evaluation::repository::{
    EvaluationRecord, EvaluationRepository, InMemoryEvaluationRepository,
    InMemoryNotificationPublisher, NoticeError, NotificationPublisher, RepositoryError,
    WorkflowNotice,
};
use crate::workflows::evaluation::scoring::{
    weight_for, AiIndicatorScore, AiScoreSubmission, FinalScoreRequest, IndicatorScore,
    ManualScore,
};
use crate::workflows::evaluation::service::{EvaluationService, ScoringPolicy};
use crate::workflows::evaluation::evaluation_router;

pub(super) const OFFICE: &str = "office-math";
pub(super) const YEAR: i32 = 2025;

pub(super) type MemoryService =
    EvaluationService<InMemoryEvaluationRepository, InMemoryNotificationPublisher>;

pub(super) fn actor(user: &str, name: &str, role: UserRole, office: Option<&str>) -> ActorContext {
    ActorContext {
        user_id: UserId(user.to_string()),
        name: name.to_string(),
        role,
        office_id: office.map(|id| OfficeId(id.to_string())),
    }
}

pub(super) fn teaching_office() -> ActorContext {
    actor("u-director", "Li Wei", UserRole::TeachingOffice, Some(OFFICE))
}

pub(super) fn team_reviewer() -> ActorContext {
    actor("u-team", "Zhang Min", UserRole::EvaluationTeam, None)
}

pub(super) fn second_team_reviewer() -> ActorContext {
    actor("u-team-2", "Zhou Jie", UserRole::EvaluationTeam, None)
}

pub(super) fn office_reviewer() -> ActorContext {
    actor("u-office", "Wang Fang", UserRole::EvaluationOffice, None)
}

pub(super) fn president() -> ActorContext {
    actor("u-president", "Chen Hua", UserRole::PresidentOffice, None)
}

pub(super) fn content() -> SelfEvaluationContent {
    let mut content = SelfEvaluationContent::default();
    content
        .declared_counts
        .insert(IndicatorKey::TeachingReformProjects, 2);
    content
        .declared_counts
        .insert(IndicatorKey::HonoraryAwards, 1);
    content.statements.insert(
        IndicatorKey::CourseConstruction,
        "Two first-class courses rebuilt this year".to_string(),
    );
    content
}

pub(super) fn draft() -> SelfEvaluationDraft {
    SelfEvaluationDraft {
        office_id: OfficeId(OFFICE.to_string()),
        evaluation_year: YEAR,
        content: content(),
    }
}

pub(super) fn scores(values: [f64; 8]) -> Vec<IndicatorScore> {
    [
        IndicatorKey::TeachingProcessManagement,
        IndicatorKey::CourseConstruction,
        IndicatorKey::TeachingReformProjects,
        IndicatorKey::HonoraryAwards,
        IndicatorKey::TeachingQuality,
        IndicatorKey::StudentGuidance,
        IndicatorKey::ScientificResearch,
        IndicatorKey::TeamBuilding,
    ]
    .into_iter()
    .zip(values)
    .map(|(indicator, score)| IndicatorScore {
        indicator,
        score,
        comment: String::new(),
    })
    .collect()
}

/// Indicator scores summing to 27.
pub(super) fn team_scores() -> Vec<IndicatorScore> {
    scores([5.0, 4.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0])
}

/// Indicator scores summing to 25.
pub(super) fn office_scores() -> Vec<IndicatorScore> {
    scores([4.0, 4.0, 5.0, 4.0, 3.0, 2.0, 2.0, 1.0])
}

pub(super) fn ai_submission(reform: u32, awards: u32) -> AiScoreSubmission {
    AiScoreSubmission {
        total_score: 82.5,
        indicator_scores: vec![
            AiIndicatorScore {
                indicator: IndicatorKey::TeachingReformProjects,
                score: 16.0,
                reasoning: "Two provincial projects".to_string(),
            },
            AiIndicatorScore {
                indicator: IndicatorKey::HonoraryAwards,
                score: 12.0,
                reasoning: "One national award".to_string(),
            },
        ],
        parsed_counts: BTreeMap::from([
            (IndicatorKey::TeachingReformProjects, reform),
            (IndicatorKey::HonoraryAwards, awards),
        ]),
    }
}

pub(super) fn final_request(value: f64) -> FinalScoreRequest {
    FinalScoreRequest {
        final_score: value,
        summary: "Solid year with strong reform work".to_string(),
    }
}

pub(super) fn timestamp(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn manual_score(
    reviewer: &str,
    role: ReviewerRole,
    values: Vec<IndicatorScore>,
    hour: u32,
) -> ManualScore {
    ManualScore {
        id: ScoreRecordId(format!("score-{reviewer}-{hour}")),
        reviewer_id: UserId(reviewer.to_string()),
        reviewer_name: reviewer.to_string(),
        reviewer_role: role,
        weight: weight_for(role),
        scores: values,
        submitted_at: timestamp(hour),
    }
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryEvaluationRepository>,
    Arc<InMemoryNotificationPublisher>,
) {
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let notices = Arc::new(InMemoryNotificationPublisher::default());
    let service =
        EvaluationService::new(repository.clone(), notices.clone(), ScoringPolicy::default());
    (service, repository, notices)
}

pub(super) fn locked_evaluation(service: &MemoryService) -> EvaluationId {
    locked_evaluation_for(service, OFFICE)
}

pub(super) fn locked_evaluation_for(service: &MemoryService, office: &str) -> EvaluationId {
    let director = actor("u-director", "Li Wei", UserRole::TeachingOffice, Some(office));
    let draft = SelfEvaluationDraft {
        office_id: OfficeId(office.to_string()),
        ..draft()
    };
    let record = service.save_draft(&director, draft).expect("draft saved");
    service.submit(&director, record.id()).expect("submitted");
    record.id().clone()
}

pub(super) fn ai_scored_evaluation(service: &MemoryService) -> EvaluationId {
    ai_scored_evaluation_for(service, OFFICE)
}

fn ai_scored_evaluation_for(service: &MemoryService, office: &str) -> EvaluationId {
    let id = locked_evaluation_for(service, office);
    service
        .record_ai_score(&id, ai_submission(2, 1))
        .expect("AI score recorded");
    id
}

pub(super) fn ready_for_final_evaluation(service: &MemoryService) -> EvaluationId {
    ready_for_final_evaluation_for(service, OFFICE)
}

fn ready_for_final_evaluation_for(service: &MemoryService, office: &str) -> EvaluationId {
    let id = ai_scored_evaluation_for(service, office);
    service
        .submit_manual_score(&team_reviewer(), &id, team_scores())
        .expect("team score");
    service
        .submit_manual_score(&office_reviewer(), &id, office_scores())
        .expect("office score");
    id
}

pub(super) fn finalized_evaluation(service: &MemoryService) -> EvaluationId {
    finalized_evaluation_for(service, OFFICE)
}

pub(super) fn finalized_evaluation_for(service: &MemoryService, office: &str) -> EvaluationId {
    let id = ready_for_final_evaluation_for(service, office);
    service
        .determine_final(&office_reviewer(), &id, final_request(26.0))
        .expect("final score");
    id
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    evaluation_router(Arc::new(service))
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_batch(
        &self,
        _records: Vec<EvaluationRecord>,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_office(
        &self,
        _office_id: &OfficeId,
        _evaluation_year: i32,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct OfflineNotices;

impl NotificationPublisher for OfflineNotices {
    fn publish(&self, _notice: WorkflowNotice) -> Result<(), NoticeError> {
        Err(NoticeError::Transport("mail relay offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
