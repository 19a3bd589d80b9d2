use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AnomalyId, EvaluationId, SelfEvaluationContent, UserId};
use super::error::ValidationError;
use super::indicators::{IndicatorCatalogue, IndicatorKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    CountMismatch,
    MissingAttachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Pending,
    Handled,
}

impl AnomalyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Handled => "handled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandledAction {
    Reject,
    Correct,
}

impl HandledAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Correct => "correct",
        }
    }
}

/// Reviewer decision on a pending anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AnomalyResolution {
    /// Send the evaluation back to its office for supplementary material.
    Reject { reason: String },
    /// Overwrite the disputed declared count.
    Correct { corrected_value: u32, note: String },
}

impl AnomalyResolution {
    pub const fn action(&self) -> HandledAction {
        match self {
            Self::Reject { .. } => HandledAction::Reject,
            Self::Correct { .. } => HandledAction::Correct,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Reject { reason } if reason.trim().is_empty() => {
                Err(ValidationError::MissingReason)
            }
            Self::Correct { note, .. } if note.trim().is_empty() => {
                Err(ValidationError::MissingCorrectionNote)
            }
            _ => Ok(()),
        }
    }
}

/// Mismatch between a declared count and what attachment parsing found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: AnomalyId,
    pub evaluation_id: EvaluationId,
    pub kind: AnomalyKind,
    pub indicator: IndicatorKey,
    pub declared_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_count: Option<u32>,
    pub description: String,
    pub status: AnomalyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_action: Option<HandledAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<AnomalyResolution>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnomalyError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("anomaly {id} was already handled ({})", .action.label())]
    AlreadyHandled { id: AnomalyId, action: HandledAction },
}

impl Anomaly {
    /// Apply a one-shot resolution. Once handled, the anomaly never changes again.
    pub fn handle(
        &mut self,
        resolution: AnomalyResolution,
        handled_by: UserId,
        handled_at: DateTime<Utc>,
    ) -> Result<(), AnomalyError> {
        if let Some(action) = self.handled_action {
            return Err(AnomalyError::AlreadyHandled {
                id: self.id.clone(),
                action,
            });
        }
        resolution.validate()?;

        self.status = AnomalyStatus::Handled;
        self.handled_action = Some(resolution.action());
        self.handled_by = Some(handled_by);
        self.handled_at = Some(handled_at);
        self.resolution = Some(resolution);
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == AnomalyStatus::Pending
    }
}

/// Anomaly found during detection, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedAnomaly {
    pub kind: AnomalyKind,
    pub indicator: IndicatorKey,
    pub declared_count: u32,
    pub parsed_count: Option<u32>,
    pub description: String,
}

/// Compare declared counts with parsed counts for every count-sensitive indicator.
pub fn detect_anomalies(
    content: &SelfEvaluationContent,
    parsed_counts: &BTreeMap<IndicatorKey, u32>,
    catalogue: &IndicatorCatalogue,
) -> Vec<DetectedAnomaly> {
    catalogue
        .count_sensitive()
        .filter_map(|indicator| {
            let declared = content.declared_count(indicator.key);
            match parsed_counts.get(&indicator.key).copied() {
                None if declared > 0 => Some(DetectedAnomaly {
                    kind: AnomalyKind::MissingAttachment,
                    indicator: indicator.key,
                    declared_count: declared,
                    parsed_count: None,
                    description: format!(
                        "declared {declared} {} but no supporting attachments were parsed",
                        indicator.label.to_lowercase()
                    ),
                }),
                Some(parsed) if parsed != declared => Some(DetectedAnomaly {
                    kind: AnomalyKind::CountMismatch,
                    indicator: indicator.key,
                    declared_count: declared,
                    parsed_count: Some(parsed),
                    description: describe_mismatch(indicator.label, declared, parsed),
                }),
                _ => None,
            }
        })
        .collect()
}

fn describe_mismatch(label: &str, declared: u32, parsed: u32) -> String {
    let label = label.to_lowercase();
    let diff = declared.abs_diff(parsed);
    if declared > parsed {
        format!(
            "declared {declared} {label} but attachments support {parsed}; \
             {diff} supporting document(s) missing, check for omitted uploads or a wrong count"
        )
    } else {
        format!(
            "declared {declared} {label} but attachments support {parsed}; \
             {diff} extra document(s), check for duplicate uploads or misclassification"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(reform: u32, awards: u32) -> SelfEvaluationContent {
        let mut content = SelfEvaluationContent::default();
        content
            .declared_counts
            .insert(IndicatorKey::TeachingReformProjects, reform);
        content
            .declared_counts
            .insert(IndicatorKey::HonoraryAwards, awards);
        content
    }

    #[test]
    fn matching_counts_produce_no_anomalies() {
        let parsed = BTreeMap::from([
            (IndicatorKey::TeachingReformProjects, 2),
            (IndicatorKey::HonoraryAwards, 1),
        ]);
        let found = detect_anomalies(&content(2, 1), &parsed, &IndicatorCatalogue::standard());
        assert!(found.is_empty());
    }

    #[test]
    fn mismatch_describes_the_shortfall() {
        let parsed = BTreeMap::from([
            (IndicatorKey::TeachingReformProjects, 2),
            (IndicatorKey::HonoraryAwards, 1),
        ]);
        let found = detect_anomalies(&content(3, 1), &parsed, &IndicatorCatalogue::standard());
        assert_eq!(found.len(), 1);
        let anomaly = &found[0];
        assert_eq!(anomaly.kind, AnomalyKind::CountMismatch);
        assert_eq!(anomaly.indicator, IndicatorKey::TeachingReformProjects);
        assert_eq!(anomaly.parsed_count, Some(2));
        assert!(anomaly.description.contains("declared 3"));
        assert!(anomaly.description.contains("1 supporting document(s) missing"));
    }

    #[test]
    fn surplus_attachments_are_flagged_as_extra() {
        let parsed = BTreeMap::from([
            (IndicatorKey::TeachingReformProjects, 0),
            (IndicatorKey::HonoraryAwards, 4),
        ]);
        let found = detect_anomalies(&content(0, 2), &parsed, &IndicatorCatalogue::standard());
        assert_eq!(found.len(), 1);
        assert!(found[0].description.contains("2 extra document(s)"));
    }

    #[test]
    fn missing_parse_result_with_declared_items_is_missing_attachment() {
        let parsed = BTreeMap::from([(IndicatorKey::TeachingReformProjects, 1)]);
        let found = detect_anomalies(&content(1, 2), &parsed, &IndicatorCatalogue::standard());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, AnomalyKind::MissingAttachment);
        assert_eq!(found[0].indicator, IndicatorKey::HonoraryAwards);
        assert_eq!(found[0].parsed_count, None);
    }

    #[test]
    fn resolutions_require_reason_or_note() {
        let reject = AnomalyResolution::Reject {
            reason: "   ".to_string(),
        };
        assert_eq!(reject.validate(), Err(ValidationError::MissingReason));

        let correct = AnomalyResolution::Correct {
            corrected_value: 2,
            note: String::new(),
        };
        assert_eq!(correct.validate(), Err(ValidationError::MissingCorrectionNote));
    }
}
