use super::super::domain::ReviewerRole;

/// Fixed reviewer weights, in [`ReviewerRole::ordered`] order. Policy changes happen here and
/// nowhere else.
pub const REVIEWER_WEIGHTS: [(ReviewerRole, f64); 2] = [
    (ReviewerRole::EvaluationTeam, 0.7),
    (ReviewerRole::EvaluationOffice, 0.5),
];

/// Roles that must each have scored before a final score may be determined.
pub const REQUIRED_REVIEWER_ROLES: [ReviewerRole; 2] =
    [ReviewerRole::EvaluationTeam, ReviewerRole::EvaluationOffice];

pub fn weight_for(role: ReviewerRole) -> f64 {
    match role {
        ReviewerRole::EvaluationTeam => REVIEWER_WEIGHTS[0].1,
        ReviewerRole::EvaluationOffice => REVIEWER_WEIGHTS[1].1,
    }
}
