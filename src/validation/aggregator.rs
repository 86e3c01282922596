// Confidence aggregation and the build/revise/drop rule
//
// Pure functions: same inputs, same snapshot, no I/O. Route handlers and
// the refinement loop both lean on this being recomputable at any time.

use crate::models::{FeedbackSnapshot, Pillar, PillarResult, PillarScoreEntry, Recommendation};
use std::collections::BTreeMap;

/// Confidence at or above this recommends building
pub const BUILD_THRESHOLD: u8 = 70;
/// Confidence at or above this (but below build) recommends revising
pub const REVISE_THRESHOLD: u8 = 40;

/// Weighted mean of `(weight, score)` entries on the 0-100 scale, rounded
/// to the nearest integer. Returns 0 when there is no weight to average.
pub fn weighted_confidence(entries: &[(f64, f64)]) -> u8 {
    let total_weight: f64 = entries.iter().map(|(weight, _)| weight).sum();
    if total_weight <= 0.0 {
        return 0;
    }
    let weighted_sum: f64 = entries.iter().map(|(weight, score)| weight * score).sum();
    (weighted_sum / total_weight).round().clamp(0.0, 100.0) as u8
}

/// The fixed recommendation rule: build at 70+, revise at 40-69, drop below
pub fn recommendation_for(confidence: u8) -> Recommendation {
    if confidence >= BUILD_THRESHOLD {
        Recommendation::Build
    } else if confidence >= REVISE_THRESHOLD {
        Recommendation::Revise
    } else {
        Recommendation::Drop
    }
}

/// Collapse pillar results into a feedback snapshot with equal weights
pub fn aggregate(results: &[PillarResult]) -> FeedbackSnapshot {
    aggregate_with_weights(results, &BTreeMap::new())
}

/// Collapse pillar results into a feedback snapshot. Pillar scores live on
/// the 0-10 scale and are lifted to 0-100 before averaging. Pillars absent
/// from the weight map count with weight 1.
pub fn aggregate_with_weights(
    results: &[PillarResult],
    weights: &BTreeMap<Pillar, f64>,
) -> FeedbackSnapshot {
    let entries: Vec<(f64, f64)> = results
        .iter()
        .map(|result| {
            let weight = weights.get(&result.pillar_id).copied().unwrap_or(1.0);
            (weight, result.score * 10.0)
        })
        .collect();

    let overall_confidence = weighted_confidence(&entries);
    let scores = results
        .iter()
        .map(|result| {
            (
                result.pillar_id,
                PillarScoreEntry {
                    score: result.score,
                    rationale: result.analysis.clone(),
                },
            )
        })
        .collect();

    FeedbackSnapshot {
        recommendation: recommendation_for(overall_confidence),
        overall_confidence,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar_results(scores: &[f64]) -> Vec<PillarResult> {
        Pillar::all()
            .iter()
            .zip(scores)
            .map(|(pillar, score)| PillarResult {
                pillar_id: *pillar,
                pillar_name: pillar.display_name().to_string(),
                score: *score,
                analysis: format!("{} analysis", pillar.display_name()),
                strength: "strength".to_string(),
                weakness: "weakness".to_string(),
                improvement_suggestion: "suggestion".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_recommendation_boundaries_are_exact() {
        assert_eq!(recommendation_for(100), Recommendation::Build);
        assert_eq!(recommendation_for(70), Recommendation::Build);
        assert_eq!(recommendation_for(69), Recommendation::Revise);
        assert_eq!(recommendation_for(40), Recommendation::Revise);
        assert_eq!(recommendation_for(39), Recommendation::Drop);
        assert_eq!(recommendation_for(0), Recommendation::Drop);
    }

    #[test]
    fn test_weighted_confidence_equal_weights() {
        let entries: Vec<(f64, f64)> = [90.0, 30.0, 60.0].iter().map(|s| (1.0, *s)).collect();
        assert_eq!(weighted_confidence(&entries), 60);
    }

    #[test]
    fn test_weighted_confidence_rounds_to_nearest() {
        let entries = vec![(1.0, 50.0), (1.0, 51.0)];
        assert_eq!(weighted_confidence(&entries), 51);

        let entries = vec![(1.0, 50.0), (1.0, 50.0), (1.0, 51.0)];
        assert_eq!(weighted_confidence(&entries), 50);
    }

    #[test]
    fn test_weighted_confidence_respects_weights() {
        let entries = vec![(3.0, 100.0), (1.0, 0.0)];
        assert_eq!(weighted_confidence(&entries), 75);
    }

    #[test]
    fn test_weighted_confidence_empty_is_zero() {
        assert_eq!(weighted_confidence(&[]), 0);
        assert_eq!(weighted_confidence(&[(0.0, 90.0)]), 0);
    }

    #[test]
    fn test_aggregate_seven_pillar_example() {
        // Mean of [9, 3, 6, 5, 4, 7, 5] is 5.571..., lifted to 55.71 and
        // rounded to 56: squarely in revise territory
        let results = pillar_results(&[9.0, 3.0, 6.0, 5.0, 4.0, 7.0, 5.0]);
        let snapshot = aggregate(&results);

        assert_eq!(snapshot.overall_confidence, 56);
        assert_eq!(snapshot.recommendation, Recommendation::Revise);
        assert_eq!(snapshot.scores.len(), 7);
        assert_eq!(snapshot.scores[&Pillar::ProblemClarity].score, 3.0);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let results = pillar_results(&[9.0, 3.0, 6.0, 5.0, 4.0, 7.0, 5.0]);
        assert_eq!(aggregate(&results), aggregate(&results));
    }

    #[test]
    fn test_aggregate_with_weights_shifts_the_mean() {
        let results = pillar_results(&[10.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        let equal = aggregate(&results);

        let mut weights = BTreeMap::new();
        weights.insert(Pillar::AudienceFit, 7.0);
        let weighted = aggregate_with_weights(&results, &weights);

        assert!(weighted.overall_confidence > equal.overall_confidence);
    }

    #[test]
    fn test_aggregate_thresholds_through_snapshot() {
        let all_nines = pillar_results(&[9.0; 7]);
        assert_eq!(aggregate(&all_nines).recommendation, Recommendation::Build);

        let all_ones = pillar_results(&[1.0; 7]);
        assert_eq!(aggregate(&all_ones).recommendation, Recommendation::Drop);
    }
}
