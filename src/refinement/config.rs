// Refinement loop configuration

use crate::models::Pillar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default confidence at which refinement stops
pub const DEFAULT_TARGET_CONFIDENCE: u8 = 95;
/// Default iteration cap per run
pub const DEFAULT_MAX_ITERATIONS: u32 = 6;
/// Lowest accepted iteration cap
pub const MIN_ITERATION_CAP: u32 = 1;
/// Highest accepted iteration cap
pub const MAX_ITERATION_CAP: u32 = 10;

/// Tunables for one refinement run. Arrives on the refine request; every
/// field falls back to its default when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RefinementConfig {
    /// Stop once overall confidence reaches this value (0-100)
    pub target_confidence: u8,
    /// Hard cap on improvement rounds
    pub max_iterations: u32,
    /// Optional per-pillar weights for the confidence aggregate.
    /// Pillars left out count with weight 1.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pillar_weights: BTreeMap<Pillar, f64>,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        RefinementConfig {
            target_confidence: DEFAULT_TARGET_CONFIDENCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            pillar_weights: BTreeMap::new(),
        }
    }
}

impl RefinementConfig {
    /// Force every field into its supported range: target capped at 100,
    /// iteration cap clamped to 1-10, non-positive weights dropped.
    pub fn clamped(mut self) -> Self {
        self.target_confidence = self.target_confidence.min(100);
        self.max_iterations = self.max_iterations.clamp(MIN_ITERATION_CAP, MAX_ITERATION_CAP);
        self.pillar_weights.retain(|_, weight| *weight > 0.0);
        self
    }

    /// The termination target on the per-pillar 0-10 scale
    pub fn pillar_target(&self) -> f64 {
        self.target_confidence as f64 / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RefinementConfig::default();
        assert_eq!(config.target_confidence, 95);
        assert_eq!(config.max_iterations, 6);
        assert!(config.pillar_weights.is_empty());
    }

    #[test]
    fn test_clamped_bounds_iterations() {
        let zero = RefinementConfig {
            max_iterations: 0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(zero.max_iterations, 1);

        let huge = RefinementConfig {
            max_iterations: 50,
            ..Default::default()
        }
        .clamped();
        assert_eq!(huge.max_iterations, 10);
    }

    #[test]
    fn test_clamped_caps_target() {
        let config = RefinementConfig {
            target_confidence: 140,
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.target_confidence, 100);
    }

    #[test]
    fn test_clamped_drops_non_positive_weights() {
        let mut weights = BTreeMap::new();
        weights.insert(Pillar::AudienceFit, 2.0);
        weights.insert(Pillar::Monetisation, 0.0);
        weights.insert(Pillar::Feasibility, -1.0);

        let config = RefinementConfig {
            pillar_weights: weights,
            ..Default::default()
        }
        .clamped();

        assert_eq!(config.pillar_weights.len(), 1);
        assert_eq!(config.pillar_weights[&Pillar::AudienceFit], 2.0);
    }

    #[test]
    fn test_pillar_target_scale() {
        let config = RefinementConfig::default();
        assert!((config.pillar_target() - 9.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserializes_with_partial_fields() {
        let config: RefinementConfig =
            serde_json::from_str(r#"{"targetConfidence": 80}"#).unwrap();
        assert_eq!(config.target_confidence, 80);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    }
}
