//! Consensus strategy trait
//!
//! Different strategies can be plugged in to change how the ensemble's
//! responses are ranked and synthesized.

use async_trait::async_trait;

use crate::core::error::ConsensusError;
use crate::core::response::ModelResponse;
use crate::ranking::result::RankingResult;

/// The capability every consensus strategy exposes and every caller
/// depends on.
///
/// Implementations:
/// - MajorityVoteStrategy: one alignment-scoring call, anchored synthesis
/// - EloRankingStrategy: debiased all-pairs tournament, anonymous synthesis
/// - CouncilStrategy: five-phase adversarial debate with a debate tree
///
/// `generate_consensus` runs the same ranking logic as `rank_responses`
/// before selecting what to synthesize; the two entry points never diverge
/// on how responses are ordered.
#[async_trait]
pub trait ConsensusStrategy: Send + Sync {
    /// Name of this strategy
    fn name(&self) -> &'static str;

    /// Minimum number of responses this strategy can work with
    fn min_responses(&self) -> usize;

    /// Rank the given responses by estimated quality, best first.
    async fn rank_responses(
        &self,
        responses: &[ModelResponse],
        prompt: &str,
    ) -> Result<Vec<RankingResult>, ConsensusError>;

    /// Synthesize one consensus answer from the top-ranked responses.
    /// `top_n` of `None` or `Some(0)` selects the strategy's own default,
    /// clamped to the available count.
    async fn generate_consensus(
        &self,
        responses: &[ModelResponse],
        top_n: Option<usize>,
        prompt: &str,
    ) -> Result<String, ConsensusError>;

    /// Precondition shared by both entry points: fail fast, before any
    /// provider call, when the ensemble is too small for the protocol.
    fn ensure_enough_responses(&self, responses: &[ModelResponse]) -> Result<(), ConsensusError> {
        if responses.len() < self.min_responses() {
            return Err(ConsensusError::TooFewResponses {
                strategy: self.name(),
                required: self.min_responses(),
                actual: responses.len(),
            });
        }
        Ok(())
    }
}

/// Resolve a caller-supplied `top_n` against a strategy default and the
/// number of available candidates.
pub fn resolve_top_n(top_n: Option<usize>, default: usize, available: usize) -> usize {
    top_n
        .filter(|n| *n > 0)
        .unwrap_or(default)
        .min(available)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMinimum(usize);

    #[async_trait]
    impl ConsensusStrategy for FixedMinimum {
        fn name(&self) -> &'static str {
            "fixed-minimum"
        }

        fn min_responses(&self) -> usize {
            self.0
        }

        async fn rank_responses(
            &self,
            _responses: &[ModelResponse],
            _prompt: &str,
        ) -> Result<Vec<RankingResult>, ConsensusError> {
            Ok(Vec::new())
        }

        async fn generate_consensus(
            &self,
            _responses: &[ModelResponse],
            _top_n: Option<usize>,
            _prompt: &str,
        ) -> Result<String, ConsensusError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_ensure_enough_responses_names_the_strategy() {
        let strategy = FixedMinimum(3);
        let responses = vec![ModelResponse::new("m1", "One", "a")];

        let result = strategy.ensure_enough_responses(&responses);
        assert!(matches!(
            result,
            Err(ConsensusError::TooFewResponses {
                strategy: "fixed-minimum",
                required: 3,
                actual: 1,
            })
        ));
    }

    #[test]
    fn test_ensure_enough_responses_passes_at_the_minimum() {
        let strategy = FixedMinimum(1);
        let responses = vec![ModelResponse::new("m1", "One", "a")];
        assert!(strategy.ensure_enough_responses(&responses).is_ok());
    }

    #[test]
    fn test_resolve_top_n_uses_default_for_none_and_zero() {
        assert_eq!(resolve_top_n(None, 3, 5), 3);
        assert_eq!(resolve_top_n(Some(0), 3, 5), 3);
    }

    #[test]
    fn test_resolve_top_n_clamps_to_available() {
        assert_eq!(resolve_top_n(Some(10), 3, 4), 4);
        assert_eq!(resolve_top_n(None, 3, 2), 2);
    }

    #[test]
    fn test_resolve_top_n_passes_through_in_range() {
        assert_eq!(resolve_top_n(Some(2), 3, 5), 2);
    }
}
