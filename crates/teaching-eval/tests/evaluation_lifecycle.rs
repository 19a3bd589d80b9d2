//! End-to-end scenarios for the teaching office evaluation lifecycle.
//!
//! Everything goes through the public service facade and HTTP router: draft, submission, AI
//! scoring, dual manual review, final score, approval, publication, and the scoring audit.

mod common {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use teaching_eval::workflows::evaluation::{
        ActorContext, AiIndicatorScore, AiScoreSubmission, EvaluationService, IndicatorKey,
        IndicatorScore, InMemoryEvaluationRepository, InMemoryNotificationPublisher, OfficeId,
        ScoringPolicy, SelfEvaluationContent, SelfEvaluationDraft, UserId, UserRole,
    };

    pub(super) type Service =
        EvaluationService<InMemoryEvaluationRepository, InMemoryNotificationPublisher>;

    pub(super) fn actor(user: &str, role: UserRole, office: Option<&str>) -> ActorContext {
        ActorContext {
            user_id: UserId(user.to_string()),
            name: user.to_string(),
            role,
            office_id: office.map(|id| OfficeId(id.to_string())),
        }
    }

    pub(super) fn director(office: &str) -> ActorContext {
        actor("director", UserRole::TeachingOffice, Some(office))
    }

    pub(super) fn team() -> ActorContext {
        actor("team-reviewer", UserRole::EvaluationTeam, None)
    }

    pub(super) fn office() -> ActorContext {
        actor("office-reviewer", UserRole::EvaluationOffice, None)
    }

    pub(super) fn president() -> ActorContext {
        actor("president", UserRole::PresidentOffice, None)
    }

    pub(super) fn draft(office: &str) -> SelfEvaluationDraft {
        let mut content = SelfEvaluationContent::default();
        content
            .declared_counts
            .insert(IndicatorKey::TeachingReformProjects, 3);
        content
            .declared_counts
            .insert(IndicatorKey::HonoraryAwards, 2);
        SelfEvaluationDraft {
            office_id: OfficeId(office.to_string()),
            evaluation_year: 2025,
            content,
        }
    }

    pub(super) fn ai_result(reform: u32, awards: u32) -> AiScoreSubmission {
        AiScoreSubmission {
            total_score: 78.0,
            indicator_scores: vec![AiIndicatorScore {
                indicator: IndicatorKey::TeachingReformProjects,
                score: 15.0,
                reasoning: "Provincial reform projects".to_string(),
            }],
            parsed_counts: BTreeMap::from([
                (IndicatorKey::TeachingReformProjects, reform),
                (IndicatorKey::HonoraryAwards, awards),
            ]),
        }
    }

    pub(super) fn scores(entries: &[(IndicatorKey, f64)]) -> Vec<IndicatorScore> {
        entries
            .iter()
            .map(|(indicator, score)| IndicatorScore {
                indicator: *indicator,
                score: *score,
                comment: String::new(),
            })
            .collect()
    }

    pub(super) fn team_scores() -> Vec<IndicatorScore> {
        scores(&[
            (IndicatorKey::TeachingProcessManagement, 12.0),
            (IndicatorKey::CourseConstruction, 13.0),
            (IndicatorKey::TeachingReformProjects, 17.0),
            (IndicatorKey::HonoraryAwards, 12.0),
            (IndicatorKey::TeachingQuality, 13.0),
            (IndicatorKey::StudentGuidance, 8.0),
        ])
    }

    pub(super) fn office_scores() -> Vec<IndicatorScore> {
        scores(&[
            (IndicatorKey::TeachingProcessManagement, 11.0),
            (IndicatorKey::CourseConstruction, 12.0),
            (IndicatorKey::TeachingReformProjects, 16.0),
            (IndicatorKey::HonoraryAwards, 12.0),
            (IndicatorKey::TeachingQuality, 12.0),
            (IndicatorKey::StudentGuidance, 7.0),
        ])
    }

    pub(super) fn build_service() -> (
        Arc<Service>,
        Arc<InMemoryEvaluationRepository>,
        Arc<InMemoryNotificationPublisher>,
    ) {
        let repository = Arc::new(InMemoryEvaluationRepository::default());
        let notices = Arc::new(InMemoryNotificationPublisher::default());
        let service = EvaluationService::new(
            repository.clone(),
            notices.clone(),
            ScoringPolicy::default(),
        );
        (Arc::new(service), repository, notices)
    }
}

mod lifecycle {
    use super::common::*;
    use teaching_eval::workflows::evaluation::{
        status_breakdown, AnomalyResolution, AnomalyStatus, ApprovalDecision, ApprovalRequest,
        EvaluationError, EvaluationRepository, EvaluationStatus, FinalScoreRequest,
        IndicatorKey, PublicationRequest,
    };

    #[test]
    fn evaluation_runs_from_draft_to_publication() {
        let (service, repository, notices) = build_service();

        let record = service
            .save_draft(&director("office-cs"), draft("office-cs"))
            .expect("draft saved");
        let id = record.id().clone();
        service
            .submit(&director("office-cs"), &id)
            .expect("submitted");
        service
            .trigger_ai_scoring(&team(), &id)
            .expect("AI scoring requested");
        service
            .record_ai_score(&id, ai_result(2, 2))
            .expect("AI score stored");

        let pending = service
            .anomalies(&id, Some(AnomalyStatus::Pending))
            .expect("anomalies");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].indicator, IndicatorKey::TeachingReformProjects);
        service
            .handle_anomaly(
                &office(),
                &id,
                &pending[0].id,
                AnomalyResolution::Correct {
                    corrected_value: 2,
                    note: "Third project belongs to next year".to_string(),
                },
            )
            .expect("anomaly corrected");

        service
            .submit_manual_score(&team(), &id, team_scores())
            .expect("team score");
        let receipt = service
            .submit_manual_score(&office(), &id, office_scores())
            .expect("office score");
        assert_eq!(receipt.status, EvaluationStatus::ReadyForFinal);

        let board = service.score_board(&id).expect("score board");
        let calculated = board.calculated_score.expect("calculated score");
        // (75 * 0.7 + 70 * 0.5) / 1.2
        assert!((calculated - 72.9167).abs() < 1e-3);
        assert_eq!(board.calculated_score_display, Some(72.9));
        assert!(board.can_submit_final);

        service
            .determine_final(
                &office(),
                &id,
                FinalScoreRequest {
                    final_score: 73.0,
                    summary: "Consistent reviewer scores".to_string(),
                },
            )
            .expect("final score");

        let approval = service
            .decide_approval(
                &president(),
                ApprovalRequest {
                    evaluation_ids: vec![id.clone()],
                    decision: ApprovalDecision::Approve,
                },
            )
            .expect("approved");
        assert!(approval.notified);

        service
            .publish(
                &office(),
                PublicationRequest {
                    evaluation_ids: vec![id.clone()],
                },
            )
            .expect("published");

        let records = repository.list().expect("list");
        let breakdown = status_breakdown(&records);
        assert_eq!(breakdown.get(&EvaluationStatus::Published), Some(&1));

        let templates: Vec<_> = notices
            .events()
            .into_iter()
            .map(|notice| notice.template)
            .collect();
        assert_eq!(
            templates,
            vec!["ai_scoring_requested", "results_approved", "results_published"]
        );
    }

    #[test]
    fn published_evaluations_are_frozen() {
        let (service, _, _) = build_service();
        let record = service
            .save_draft(&director("office-ee"), draft("office-ee"))
            .expect("draft saved");
        let id = record.id().clone();
        service.submit(&director("office-ee"), &id).expect("submitted");
        service
            .record_ai_score(&id, ai_result(3, 2))
            .expect("AI score stored");
        service
            .submit_manual_score(&team(), &id, team_scores())
            .expect("team score");
        service
            .submit_manual_score(&office(), &id, office_scores())
            .expect("office score");
        service
            .determine_final(
                &office(),
                &id,
                FinalScoreRequest {
                    final_score: 90.0,
                    summary: "Raised for national award".to_string(),
                },
            )
            .expect("override accepted");
        service
            .decide_approval(
                &president(),
                ApprovalRequest {
                    evaluation_ids: vec![id.clone()],
                    decision: ApprovalDecision::Approve,
                },
            )
            .expect("approved");
        service
            .publish(
                &office(),
                PublicationRequest {
                    evaluation_ids: vec![id.clone()],
                },
            )
            .expect("published");

        assert!(matches!(
            service.publish(
                &office(),
                PublicationRequest {
                    evaluation_ids: vec![id.clone()],
                },
            ),
            Err(EvaluationError::Conflict(_))
        ));
        assert!(matches!(
            service.submit_manual_score(&team(), &id, team_scores()),
            Err(EvaluationError::Conflict(_))
        ));
        assert!(matches!(
            service.save_draft(&director("office-ee"), draft("office-ee")),
            Err(EvaluationError::Conflict(_))
        ));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use teaching_eval::workflows::evaluation::evaluation_router;
    use tower::ServiceExt;

    async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("route executes");
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let payload = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, payload)
    }

    fn post(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn http_lifecycle_reaches_publication() {
        let (service, _, _) = build_service();
        let router = evaluation_router(service);

        let director = json!({
            "user_id": "director",
            "name": "Director",
            "role": "teaching_office",
            "office_id": "office-me",
        });
        let team = json!({ "user_id": "t1", "name": "Team", "role": "evaluation_team" });
        let office = json!({ "user_id": "o1", "name": "Office", "role": "evaluation_office" });
        let president = json!({ "user_id": "p1", "name": "President", "role": "president_office" });

        let (status, created) = send(
            &router,
            post(
                "/api/v1/evaluations",
                json!({
                    "actor": director,
                    "office_id": "office-me",
                    "evaluation_year": 2025,
                    "content": { "declared_counts": { "honorary_awards": 1 } },
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["evaluation_id"].as_str().expect("id").to_string();

        let (status, _) = send(
            &router,
            post(
                &format!("/api/v1/evaluations/{id}/submit"),
                json!({ "actor": director }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, ticket) = send(
            &router,
            post(
                &format!("/api/v1/evaluations/{id}/ai-scoring"),
                json!({ "actor": team }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(ticket["requested"], json!(true));

        let (status, view) = send(
            &router,
            post(
                &format!("/api/v1/evaluations/{id}/ai-score"),
                json!({
                    "total_score": 70.0,
                    "indicator_scores": [],
                    "parsed_counts": { "honorary_awards": 1, "teaching_reform_projects": 0 },
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "ai_scored");
        assert_eq!(view["pending_anomalies"], json!(0));

        for actor in [&team, &office] {
            let (status, _) = send(
                &router,
                post(
                    &format!("/api/v1/evaluations/{id}/manual-scores"),
                    json!({
                        "actor": actor,
                        "scores": [
                            { "indicator": "teaching_quality", "score": 12.0 },
                            { "indicator": "course_construction", "score": 11.5 },
                        ],
                    }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, board) = send(&router, get(&format!("/api/v1/evaluations/{id}/scores"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["status"], "ready_for_final");
        assert_eq!(board["calculated_score_display"], json!(23.5));

        let (status, _) = send(
            &router,
            post(
                &format!("/api/v1/evaluations/{id}/final-score"),
                json!({ "actor": office, "final_score": 23.5, "summary": "Accepted" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &router,
            post(
                "/api/v1/approvals",
                json!({ "actor": president, "evaluation_ids": [id], "decision": "approve" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, receipt) = send(
            &router,
            post(
                "/api/v1/publications",
                json!({ "actor": office, "evaluation_ids": [id] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["notified"], json!(true));

        let (status, view) = send(&router, get(&format!("/api/v1/evaluations/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "published");

        let (status, audit) = send(&router, get("/api/v1/scoring/audit")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audit.as_array().expect("array").len(), 4);
    }
}
