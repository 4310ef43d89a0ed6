//! Scoring: folds per-criterion scores into one overall score and a recommendation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Below this confidence the recommendation is always REQUIRES_CLARIFICATION.
pub const CONFIDENCE_GATE: f64 = 70.0;
pub const HIRE_THRESHOLD: u32 = 80;
pub const CLARIFY_THRESHOLD: u32 = 60;
/// Assumed when the evaluator does not report its confidence.
pub const DEFAULT_CONFIDENCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Hire,
    Reject,
    RequiresClarification,
    Pending,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hire => "HIRE",
            Self::Reject => "REJECT",
            Self::RequiresClarification => "REQUIRES_CLARIFICATION",
            Self::Pending => "PENDING",
        }
    }
}

/// Weighted mean of the scored criteria, renormalised over the weight actually present.
///
/// `overall = round(Σ(score_i × w_i/100) / (Σw_i/100))` over criteria in `scores`;
/// 0 when no scored criterion carries weight. Criteria missing from `weights` count
/// with weight 0. The result is clamped to 0..=100.
///
/// Validated frameworks always sum to 100, so a shortfall here means the evaluator
/// skipped criteria. That case is logged rather than rejected.
pub fn calculate_overall_score(
    scores: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
) -> u32 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (criterion, score) in scores {
        let weight = weights.get(criterion).copied().unwrap_or(0.0);
        weighted_sum += score * (weight / 100.0);
        total_weight += weight;
    }

    if total_weight <= 0.0 {
        return 0;
    }

    if total_weight < 100.0 - f64::EPSILON && !weights.is_empty() {
        let missing: Vec<&str> = weights
            .keys()
            .filter(|k| !scores.contains_key(*k))
            .map(String::as_str)
            .collect();
        warn!(
            "Overall score renormalised over {total_weight}% of weight; unscored criteria: {missing:?}"
        );
    }

    let overall = (weighted_sum / (total_weight / 100.0)).round();
    overall.clamp(0.0, 100.0) as u32
}

/// First match wins: low confidence → clarify; ≥80 → hire; ≥60 → clarify; else reject.
/// The confidence gate applies regardless of score.
pub fn determine_recommendation(overall_score: u32, confidence: f64) -> Recommendation {
    if confidence < CONFIDENCE_GATE {
        return Recommendation::RequiresClarification;
    }

    if overall_score >= HIRE_THRESHOLD {
        Recommendation::Hire
    } else if overall_score >= CLARIFY_THRESHOLD {
        Recommendation::RequiresClarification
    } else {
        Recommendation::Reject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn tech_weights() -> BTreeMap<String, f64> {
        map(&[
            ("technical", 50.0),
            ("communication", 25.0),
            ("experience", 15.0),
            ("soft_skills", 10.0),
        ])
    }

    #[test]
    fn test_no_criteria_scores_zero() {
        assert_eq!(calculate_overall_score(&BTreeMap::new(), &BTreeMap::new()), 0);
    }

    #[test]
    fn test_full_weighted_average() {
        let scores = map(&[
            ("technical", 90.0),
            ("communication", 80.0),
            ("experience", 80.0),
            ("soft_skills", 60.0),
        ]);
        // 45 + 20 + 12 + 6
        assert_eq!(calculate_overall_score(&scores, &tech_weights()), 83);
    }

    #[test]
    fn test_missing_criteria_renormalise() {
        let scores = map(&[("technical", 90.0), ("communication", 60.0)]);
        // (45 + 15) / 0.75 = 80
        assert_eq!(calculate_overall_score(&scores, &tech_weights()), 80);
    }

    #[test]
    fn test_unweighted_criterion_is_ignored() {
        let scores = map(&[("technical", 100.0), ("vibes", 0.0)]);
        let weights = map(&[("technical", 100.0)]);
        assert_eq!(calculate_overall_score(&scores, &weights), 100);
    }

    #[test]
    fn test_only_unweighted_criteria_scores_zero() {
        let scores = map(&[("vibes", 95.0)]);
        assert_eq!(calculate_overall_score(&scores, &tech_weights()), 0);
    }

    #[test]
    fn test_overall_within_bounds_for_valid_inputs() {
        let weights = tech_weights();
        for a in [0.0, 13.0, 50.0, 99.5, 100.0] {
            for b in [0.0, 42.0, 100.0] {
                let scores = map(&[
                    ("technical", a),
                    ("communication", b),
                    ("experience", a),
                    ("soft_skills", b),
                ]);
                let overall = calculate_overall_score(&scores, &weights);
                assert!(overall <= 100, "a={a} b={b} overall={overall}");
            }
        }
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let scores = map(&[("technical", 180.0)]);
        let weights = map(&[("technical", 100.0)]);
        assert_eq!(calculate_overall_score(&scores, &weights), 100);
    }

    #[test]
    fn test_low_confidence_dominates_high_score() {
        assert_eq!(determine_recommendation(95, 50.0), Recommendation::RequiresClarification);
    }

    #[test]
    fn test_confidence_gate_boundary_inclusive() {
        assert_eq!(determine_recommendation(90, 70.0), Recommendation::Hire);
        assert_eq!(determine_recommendation(90, 69.9), Recommendation::RequiresClarification);
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(determine_recommendation(85, 90.0), Recommendation::Hire);
        assert_eq!(determine_recommendation(80, 90.0), Recommendation::Hire);
        assert_eq!(determine_recommendation(79, 90.0), Recommendation::RequiresClarification);
        assert_eq!(determine_recommendation(60, 90.0), Recommendation::RequiresClarification);
        assert_eq!(determine_recommendation(59, 90.0), Recommendation::Reject);
    }

    #[test]
    fn test_low_confidence_gates_any_score() {
        assert_eq!(determine_recommendation(10, 10.0), Recommendation::RequiresClarification);
        assert_eq!(determine_recommendation(10, 90.0), Recommendation::Reject);
    }

    #[test]
    fn test_recommendation_serialises_screaming_snake() {
        let json = serde_json::to_string(&Recommendation::RequiresClarification).unwrap();
        assert_eq!(json, "\"REQUIRES_CLARIFICATION\"");
        assert_eq!(Recommendation::Hire.as_str(), "HIRE");
    }
}
