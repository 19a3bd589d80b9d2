use super::ManualScore;

/// Weighted average of each reviewer's indicator sum: `Σ(sum_i · w_i) / Σ(w_i)`.
///
/// Returns `None` when there is nothing to average. AI scores never enter this figure.
pub fn calculated_score(scores: &[ManualScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }

    let (weighted_total, total_weight) =
        scores
            .iter()
            .fold((0.0_f64, 0.0_f64), |(weighted, weights), score| {
                (
                    weighted + score.score_sum() * score.weight,
                    weights + score.weight,
                )
            });

    if total_weight <= 0.0 {
        return None;
    }

    Some(weighted_total / total_weight)
}

/// Rounds to one decimal for presentation. Stored values stay unrounded.
pub fn display_score(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Relative gap between a submitted score and the calculated one.
pub fn deviation_ratio(calculated: f64, submitted: f64) -> Option<f64> {
    if calculated <= 0.0 {
        return None;
    }
    Some((submitted - calculated).abs() / calculated)
}

/// Team rows first, then office rows; ties by submission time ascending.
pub fn sort_reviewer_scores(mut scores: Vec<ManualScore>) -> Vec<ManualScore> {
    scores.sort_by(|left, right| {
        left.reviewer_role
            .rank()
            .cmp(&right.reviewer_role.rank())
            .then_with(|| left.submitted_at.cmp(&right.submitted_at))
    });
    scores
}
