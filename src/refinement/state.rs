// Refinement loop states with transition validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The states the refinement loop moves through. One improvement round is
/// SelectWeakestPillar -> GenerateImprovement -> ReScore -> AcceptOrDiscard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Scoring,
    SelectWeakestPillar,
    GenerateImprovement,
    ReScore,
    AcceptOrDiscard,
    Done,
}

#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Invalid loop transition from {from:?} to {to:?}")]
    InvalidTransition { from: LoopState, to: LoopState },
}

/// Validates if the loop can move from one state to another
pub fn can_transition(from: LoopState, to: LoopState) -> bool {
    match (from, to) {
        // Initial scoring either enters the loop or is already good enough
        (LoopState::Scoring, LoopState::SelectWeakestPillar) => true,
        (LoopState::Scoring, LoopState::Done) => true,

        // Selection finds a pillar with room, or there is none left
        (LoopState::SelectWeakestPillar, LoopState::GenerateImprovement) => true,
        (LoopState::SelectWeakestPillar, LoopState::Done) => true,

        // The improvement round itself is strictly linear
        (LoopState::GenerateImprovement, LoopState::ReScore) => true,
        (LoopState::ReScore, LoopState::AcceptOrDiscard) => true,

        // After the verdict: next round or finished
        (LoopState::AcceptOrDiscard, LoopState::SelectWeakestPillar) => true,
        (LoopState::AcceptOrDiscard, LoopState::Done) => true,

        // All other transitions are invalid
        _ => false,
    }
}

/// Validates and performs a state transition
pub fn transition(
    current: LoopState,
    target: LoopState,
) -> Result<LoopState, StateTransitionError> {
    if !can_transition(current, target) {
        return Err(StateTransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }
    Ok(target)
}

/// Check if a state is terminal
pub fn is_terminal(state: LoopState) -> bool {
    matches!(state, LoopState::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_round_is_valid() {
        let round = [
            LoopState::Scoring,
            LoopState::SelectWeakestPillar,
            LoopState::GenerateImprovement,
            LoopState::ReScore,
            LoopState::AcceptOrDiscard,
            LoopState::SelectWeakestPillar,
        ];
        for pair in round.windows(2) {
            assert!(
                can_transition(pair[0], pair[1]),
                "{:?} -> {:?} should be valid",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_every_decision_point_can_finish() {
        assert!(can_transition(LoopState::Scoring, LoopState::Done));
        assert!(can_transition(LoopState::SelectWeakestPillar, LoopState::Done));
        assert!(can_transition(LoopState::AcceptOrDiscard, LoopState::Done));
    }

    #[test]
    fn test_mid_round_states_cannot_finish() {
        assert!(!can_transition(LoopState::GenerateImprovement, LoopState::Done));
        assert!(!can_transition(LoopState::ReScore, LoopState::Done));
    }

    #[test]
    fn test_no_skipping_within_a_round() {
        assert!(!can_transition(
            LoopState::SelectWeakestPillar,
            LoopState::ReScore
        ));
        assert!(!can_transition(
            LoopState::GenerateImprovement,
            LoopState::AcceptOrDiscard
        ));
        assert!(!can_transition(LoopState::Scoring, LoopState::GenerateImprovement));
    }

    #[test]
    fn test_done_is_terminal() {
        assert!(is_terminal(LoopState::Done));
        assert!(!is_terminal(LoopState::Scoring));
        assert!(!is_terminal(LoopState::AcceptOrDiscard));

        for target in [
            LoopState::Scoring,
            LoopState::SelectWeakestPillar,
            LoopState::GenerateImprovement,
            LoopState::ReScore,
            LoopState::AcceptOrDiscard,
            LoopState::Done,
        ] {
            assert!(!can_transition(LoopState::Done, target));
        }
    }

    #[test]
    fn test_transition_rejects_invalid_moves() {
        let result = transition(LoopState::Scoring, LoopState::ReScore);
        assert!(result.is_err());

        let ok = transition(LoopState::Scoring, LoopState::SelectWeakestPillar);
        assert_eq!(ok.unwrap(), LoopState::SelectWeakestPillar);
    }

    #[test]
    fn test_states_serialize_snake_case() {
        let json = serde_json::to_string(&LoopState::SelectWeakestPillar).unwrap();
        assert_eq!(json, r#""select_weakest_pillar""#);
    }
}
