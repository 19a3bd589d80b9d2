use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{EvaluationId, OfficeId, UserId};
use super::repository::EvaluationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    AiScore,
    ManualScore,
    FinalScore,
}

impl ScoreType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AiScore => "ai_score",
            Self::ManualScore => "manual_score",
            Self::FinalScore => "final_score",
        }
    }
}

/// One scoring event, flattened for audit queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringAuditRecord {
    pub record_id: String,
    pub evaluation_id: EvaluationId,
    pub office_id: OfficeId,
    pub evaluation_year: i32,
    pub score_type: ScoreType,
    pub score_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_role: Option<&'static str>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditFilter {
    #[serde(default)]
    pub office_id: Option<OfficeId>,
    #[serde(default)]
    pub reviewer_id: Option<UserId>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl AuditFilter {
    fn admits(&self, entry: &ScoringAuditRecord) -> bool {
        if let Some(start) = self.start {
            if entry.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.created_at > end {
                return false;
            }
        }
        match &self.reviewer_id {
            Some(reviewer) => entry.reviewer_id.as_ref() == Some(reviewer),
            None => true,
        }
    }
}

/// Flatten AI, manual, and final scores into audit entries, newest first.
pub fn collect_audit(records: &[EvaluationRecord], filter: &AuditFilter) -> Vec<ScoringAuditRecord> {
    let mut entries = Vec::new();

    for record in records {
        let evaluation = &record.evaluation;
        if let Some(office) = &filter.office_id {
            if &evaluation.office_id != office {
                continue;
            }
        }

        let entry = |record_id: &str, score_type, score_value, created_at| ScoringAuditRecord {
            record_id: record_id.to_string(),
            evaluation_id: evaluation.id.clone(),
            office_id: evaluation.office_id.clone(),
            evaluation_year: evaluation.evaluation_year,
            score_type,
            score_value,
            reviewer_id: None,
            reviewer_name: None,
            reviewer_role: None,
            created_at,
        };

        if let Some(ai) = &record.ai_score {
            entries.push(entry(&ai.id.0, ScoreType::AiScore, ai.total_score, ai.scored_at));
        }

        for manual in &record.manual_scores {
            entries.push(ScoringAuditRecord {
                reviewer_id: Some(manual.reviewer_id.clone()),
                reviewer_name: Some(manual.reviewer_name.clone()),
                reviewer_role: Some(manual.reviewer_role.label()),
                ..entry(
                    &manual.id.0,
                    ScoreType::ManualScore,
                    manual.score_sum(),
                    manual.submitted_at,
                )
            });
        }

        if let Some(final_score) = &record.final_score {
            entries.push(ScoringAuditRecord {
                reviewer_id: Some(final_score.determined_by.clone()),
                reviewer_role: Some("evaluation_office"),
                ..entry(
                    &final_score.id.0,
                    ScoreType::FinalScore,
                    final_score.final_score,
                    final_score.determined_at,
                )
            });
        }
    }

    entries.retain(|entry| filter.admits(entry));
    entries.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    entries
}

#[derive(Serialize)]
struct AuditCsvRow<'a> {
    record_id: &'a str,
    evaluation_id: &'a str,
    office_id: &'a str,
    evaluation_year: i32,
    score_type: &'static str,
    score_value: f64,
    reviewer_id: Option<&'a str>,
    reviewer_name: Option<&'a str>,
    reviewer_role: Option<&'static str>,
    created_at: String,
}

/// Write audit entries as CSV with a header row.
pub fn write_audit_csv<W: Write>(
    entries: &[ScoringAuditRecord],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(AuditCsvRow {
            record_id: &entry.record_id,
            evaluation_id: &entry.evaluation_id.0,
            office_id: &entry.office_id.0,
            evaluation_year: entry.evaluation_year,
            score_type: entry.score_type.label(),
            score_value: entry.score_value,
            reviewer_id: entry.reviewer_id.as_ref().map(|id| id.0.as_str()),
            reviewer_name: entry.reviewer_name.as_deref(),
            reviewer_role: entry.reviewer_role,
            created_at: entry.created_at.to_rfc3339(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
