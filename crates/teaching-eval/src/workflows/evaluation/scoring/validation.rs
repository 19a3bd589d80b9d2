use std::collections::BTreeSet;

use super::super::error::ValidationError;
use super::super::indicators::{IndicatorCatalogue, IndicatorKey};
use super::{AiScoreSubmission, FinalScoreRequest, IndicatorScore};

fn check_entries<I>(entries: I, catalogue: &IndicatorCatalogue) -> Result<f64, ValidationError>
where
    I: IntoIterator<Item = (IndicatorKey, f64)>,
{
    let mut seen = BTreeSet::new();
    let mut total = 0.0;

    for (indicator, score) in entries {
        if !seen.insert(indicator) {
            return Err(ValidationError::DuplicateIndicator(indicator));
        }
        if !score.is_finite() || score < 0.0 {
            return Err(ValidationError::InvalidScore { indicator, score });
        }
        total += score;
    }

    let maximum = catalogue.total_max();
    if total > maximum {
        return Err(ValidationError::TotalExceedsMaximum { total, maximum });
    }

    Ok(total)
}

/// Checks a reviewer's score set and returns its sum.
pub fn validate_manual_scores(
    scores: &[IndicatorScore],
    catalogue: &IndicatorCatalogue,
) -> Result<f64, ValidationError> {
    if scores.is_empty() {
        return Err(ValidationError::EmptyScores);
    }

    check_entries(
        scores.iter().map(|entry| (entry.indicator, entry.score)),
        catalogue,
    )
}

pub fn validate_ai_scores(
    submission: &AiScoreSubmission,
    catalogue: &IndicatorCatalogue,
) -> Result<(), ValidationError> {
    check_entries(
        submission
            .indicator_scores
            .iter()
            .map(|entry| (entry.indicator, entry.score)),
        catalogue,
    )?;

    let maximum = catalogue.total_max();
    let total = submission.total_score;
    if !total.is_finite() || total < 0.0 || total > maximum {
        return Err(ValidationError::AiTotalOutOfRange { total, maximum });
    }

    Ok(())
}

pub fn validate_final_score(
    request: &FinalScoreRequest,
    catalogue: &IndicatorCatalogue,
) -> Result<(), ValidationError> {
    let maximum = catalogue.total_max();
    let value = request.final_score;
    if !value.is_finite() || value < 0.0 || value > maximum {
        return Err(ValidationError::FinalScoreOutOfRange { value, maximum });
    }

    if request.summary.trim().is_empty() {
        return Err(ValidationError::MissingSummary);
    }

    Ok(())
}
