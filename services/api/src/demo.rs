use crate::infra::{in_memory_service, InMemoryEvaluationService};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use teaching_eval::config::ScoringConfig;
use teaching_eval::error::AppError;
use teaching_eval::workflows::evaluation::{
    status_breakdown, write_audit_csv, ActorContext, AiIndicatorScore, AiScoreSubmission,
    Anomaly, AnomalyResolution, ApprovalDecision, ApprovalRequest, AuditFilter, EvaluationError,
    EvaluationId, EvaluationRepository, EvaluationStatusView, FinalScoreRequest, IndicatorKey,
    IndicatorScore, OfficeId, PublicationRequest, ScoreBoard, ScoringAuditRecord,
    SelfEvaluationContent, SelfEvaluationDraft, UserId, UserRole,
};

const DEMO_YEAR: i32 = 2025;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Write the scoring audit trail to this CSV file.
    #[arg(long)]
    pub(crate) audit_csv: Option<PathBuf>,
    /// Print the demo results as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct DemoSummary {
    evaluations: Vec<EvaluationStatusView>,
    score_boards: Vec<ScoreBoard>,
    anomalies: Vec<Anomaly>,
    audit: Vec<ScoringAuditRecord>,
    status_breakdown: BTreeMap<&'static str, usize>,
}

struct DemoOffice {
    office_id: &'static str,
    declared_reform_projects: u32,
    declared_awards: u32,
    parsed_reform_projects: u32,
    team_scores: [f64; 8],
    office_scores: [f64; 8],
    final_override: Option<f64>,
}

const DEMO_OFFICES: [DemoOffice; 2] = [
    DemoOffice {
        office_id: "office-mathematics",
        declared_reform_projects: 3,
        declared_awards: 2,
        parsed_reform_projects: 2,
        team_scores: [13.0, 12.0, 16.0, 12.0, 13.0, 8.0, 4.0, 4.0],
        office_scores: [12.0, 12.0, 15.0, 11.0, 12.0, 8.0, 4.0, 3.0],
        final_override: None,
    },
    DemoOffice {
        office_id: "office-physics",
        declared_reform_projects: 1,
        declared_awards: 1,
        parsed_reform_projects: 1,
        team_scores: [11.0, 10.0, 12.0, 9.0, 12.0, 7.0, 3.0, 4.0],
        office_scores: [10.0, 10.0, 11.0, 9.0, 11.0, 7.0, 3.0, 3.0],
        final_override: Some(72.0),
    },
];

const INDICATOR_ORDER: [IndicatorKey; 8] = [
    IndicatorKey::TeachingProcessManagement,
    IndicatorKey::CourseConstruction,
    IndicatorKey::TeachingReformProjects,
    IndicatorKey::HonoraryAwards,
    IndicatorKey::TeachingQuality,
    IndicatorKey::StudentGuidance,
    IndicatorKey::ScientificResearch,
    IndicatorKey::TeamBuilding,
];

fn actor(user: &str, name: &str, role: UserRole, office: Option<&str>) -> ActorContext {
    ActorContext {
        user_id: UserId(user.to_string()),
        name: name.to_string(),
        role,
        office_id: office.map(|id| OfficeId(id.to_string())),
    }
}

fn evaluation_office() -> ActorContext {
    actor(
        "office-01",
        "Evaluation office reviewer",
        UserRole::EvaluationOffice,
        None,
    )
}

fn indicator_scores(values: [f64; 8]) -> Vec<IndicatorScore> {
    INDICATOR_ORDER
        .into_iter()
        .zip(values)
        .map(|(indicator, score)| IndicatorScore {
            indicator,
            score,
            comment: String::new(),
        })
        .collect()
}

fn run_office(
    service: &InMemoryEvaluationService,
    office: &DemoOffice,
) -> Result<EvaluationId, AppError> {
    let director = actor(
        &format!("director-{}", office.office_id),
        "Teaching office director",
        UserRole::TeachingOffice,
        Some(office.office_id),
    );
    let team = actor("team-01", "Evaluation team reviewer", UserRole::EvaluationTeam, None);
    let reviewer = evaluation_office();

    let mut content = SelfEvaluationContent::default();
    content.declared_counts.insert(
        IndicatorKey::TeachingReformProjects,
        office.declared_reform_projects,
    );
    content
        .declared_counts
        .insert(IndicatorKey::HonoraryAwards, office.declared_awards);

    let record = service.save_draft(
        &director,
        SelfEvaluationDraft {
            office_id: OfficeId(office.office_id.to_string()),
            evaluation_year: DEMO_YEAR,
            content,
        },
    )?;
    let id = record.id().clone();
    service.submit(&director, &id)?;
    service.trigger_ai_scoring(&team, &id)?;

    service.record_ai_score(
        &id,
        AiScoreSubmission {
            total_score: office.team_scores.iter().sum::<f64>() + 2.5,
            indicator_scores: vec![AiIndicatorScore {
                indicator: IndicatorKey::TeachingReformProjects,
                score: office.team_scores[2],
                reasoning: "Project certificates parsed from attachments".to_string(),
            }],
            parsed_counts: BTreeMap::from([
                (
                    IndicatorKey::TeachingReformProjects,
                    office.parsed_reform_projects,
                ),
                (IndicatorKey::HonoraryAwards, office.declared_awards),
            ]),
        },
    )?;

    for anomaly in service.anomalies(&id, None)? {
        if let Some(parsed) = anomaly.parsed_count {
            service.handle_anomaly(
                &team,
                &id,
                &anomaly.id,
                AnomalyResolution::Correct {
                    corrected_value: parsed,
                    note: "Count aligned with the uploaded certificates".to_string(),
                },
            )?;
        }
    }

    service.submit_manual_score(&team, &id, indicator_scores(office.team_scores))?;
    service.submit_manual_score(&reviewer, &id, indicator_scores(office.office_scores))?;

    let board = service.score_board(&id)?;
    let final_score = office
        .final_override
        .or(board.calculated_score_display)
        .unwrap_or_default();
    service.determine_final(
        &reviewer,
        &id,
        FinalScoreRequest {
            final_score,
            summary: match office.final_override {
                Some(_) => "Adjusted after reviewing award evidence".to_string(),
                None => "Accepted the calculated score".to_string(),
            },
        },
    )?;

    Ok(id)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { audit_csv, json } = args;

    let (service, repository, notices) = in_memory_service(&ScoringConfig::default());

    let mut ids = Vec::with_capacity(DEMO_OFFICES.len());
    for office in &DEMO_OFFICES {
        ids.push(run_office(&service, office)?);
    }

    let president = actor("president-01", "President office", UserRole::PresidentOffice, None);
    let approval = service.decide_approval(
        &president,
        ApprovalRequest {
            evaluation_ids: ids.clone(),
            decision: ApprovalDecision::Approve,
        },
    )?;
    let publication = service.publish(
        &evaluation_office(),
        PublicationRequest {
            evaluation_ids: ids.clone(),
        },
    )?;

    let mut evaluations = Vec::with_capacity(ids.len());
    let mut score_boards = Vec::with_capacity(ids.len());
    let mut anomalies = Vec::new();
    for id in &ids {
        evaluations.push(service.get(id)?.status_view());
        score_boards.push(service.score_board(id)?);
        anomalies.extend(service.anomalies(id, None)?);
    }

    let audit = service.audit(&AuditFilter::default())?;
    let records = repository.list().map_err(EvaluationError::from)?;
    let breakdown = status_breakdown(&records)
        .into_iter()
        .map(|(status, count)| (status.label(), count))
        .collect::<BTreeMap<_, _>>();

    if let Some(path) = &audit_csv {
        let file = File::create(path)?;
        write_audit_csv(&audit, file)?;
    }

    if json {
        let summary = DemoSummary {
            evaluations,
            score_boards,
            anomalies,
            audit,
            status_breakdown: breakdown,
        };
        let rendered = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Teaching office evaluation demo ({DEMO_YEAR})");
    for (view, board) in evaluations.iter().zip(&score_boards) {
        println!(
            "\n{} [{}] -> {} / approval {}",
            view.office_id.0, view.evaluation_id, view.status, view.approval_status
        );
        if let Some(ai) = &board.ai_score {
            println!("  AI reference score: {:.1} (display only)", ai.total_score);
        }
        for score in &board.manual_scores {
            println!(
                "  - {} ({}, weight {:.1}): {:.1}",
                score.reviewer_name,
                score.reviewer_role,
                score.weight,
                score.score_sum()
            );
        }
        if let Some(calculated) = board.calculated_score_display {
            println!("  Calculated score: {calculated:.1} / {:.0}", board.total_max);
        }
        if let Some(final_score) = &board.final_score {
            println!(
                "  Final score: {:.1} ({})",
                final_score.final_score, final_score.summary
            );
        }
    }

    if !anomalies.is_empty() {
        println!("\nAnomalies");
        for anomaly in &anomalies {
            println!(
                "- {} {}: {} [{}]",
                anomaly.evaluation_id,
                anomaly.indicator,
                anomaly.description,
                anomaly.status.label()
            );
        }
    }

    println!("\nScoring audit ({} entries, newest first)", audit.len());
    for entry in &audit {
        println!(
            "- {} {} {:.1} by {}",
            entry.evaluation_id,
            entry.score_type.label(),
            entry.score_value,
            entry.reviewer_role.unwrap_or("ai")
        );
    }

    println!("\nStatus breakdown");
    for (status, count) in &breakdown {
        println!("- {status}: {count}");
    }
    println!(
        "\nApproval {} (notified: {}), publication {} (notified: {}), {} notices sent",
        approval.approval_id,
        approval.notified,
        publication.publication_id,
        publication.notified,
        notices.events().len()
    );

    if let Some(path) = audit_csv {
        println!("Audit trail written to {}", path.display());
    }

    Ok(())
}
