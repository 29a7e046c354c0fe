//! Elo-ranking consensus strategy.
//!
//! Every pair of responses is judged twice, once in each presentation
//! order, and the two verdicts are combined into a single position-debiased
//! match outcome. Outcomes update an Elo table sequentially in pair order,
//! so the final ratings are deterministic no matter how the concurrent
//! judge calls complete.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ensemble_domain::{
    ConsensusError, ConsensusStrategy, EloTable, INITIAL_RATING, K_HIGH_CONFIDENCE,
    K_LOW_CONFIDENCE, MatchOutcome, ModelResponse, PairwiseVerdict, PromptTemplate, RankingResult,
    parse_pairwise_verdict, resolve_top_n,
};

use crate::config::StrategyModels;
use crate::ports::ai_provider::AiProvider;
use crate::strategies::shared::{CallError, check_cancelled, complete_text};

/// Returned in place of a synthesis when the summarizer call fails.
const SYNTHESIS_FAILURE: &str = "Failed to generate consensus summary.";

/// Tuning knobs for the Elo tournament.
#[derive(Debug, Clone)]
pub struct EloRankingConfig {
    /// Rating every participant starts from.
    pub initial_rating: f64,
    /// K-factor when both judgment directions agree.
    pub k_high: f64,
    /// K-factor for the forced draw when the directions disagree.
    pub k_low: f64,
    /// How many top-ranked responses feed the synthesis when the caller
    /// does not say.
    pub default_top_n: usize,
}

impl Default for EloRankingConfig {
    fn default() -> Self {
        Self {
            initial_rating: INITIAL_RATING,
            k_high: K_HIGH_CONFIDENCE,
            k_low: K_LOW_CONFIDENCE,
            default_top_n: 3,
        }
    }
}

/// Ranks responses through a debiased all-pairs judge tournament and
/// synthesizes a consensus from anonymous top candidates.
pub struct EloRankingStrategy {
    provider: Arc<dyn AiProvider>,
    models: StrategyModels,
    config: EloRankingConfig,
    call_timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl EloRankingStrategy {
    pub const MIN_RESPONSES: usize = 3;

    pub fn new(provider: Arc<dyn AiProvider>, models: StrategyModels) -> Self {
        Self {
            provider,
            models,
            config: EloRankingConfig::default(),
            call_timeout: None,
            cancellation_token: None,
        }
    }

    pub fn with_config(mut self, config: EloRankingConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a per-call timeout. A timed-out judge call counts as a failed
    /// direction for its pair.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Sets a cancellation token for aborting mid-tournament.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }
}

fn all_pairs(count: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for a in 0..count {
        for b in (a + 1)..count {
            pairs.push((a, b));
        }
    }
    pairs
}

fn settle_verdict(
    result: Result<String, CallError>,
    direction: &str,
    a: usize,
    b: usize,
) -> Option<PairwiseVerdict> {
    match result {
        Ok(raw) => {
            let verdict = parse_pairwise_verdict(&raw);
            if verdict.is_none() {
                warn!(
                    "{} judgment for pair ({}, {}) had no readable verdict",
                    direction, a, b
                );
            }
            verdict
        }
        Err(e) => {
            warn!("{} judge call for pair ({}, {}) failed: {}", direction, a, b, e);
            None
        }
    }
}

/// Combines the forward and position-swapped verdicts for one pair into a
/// single match outcome plus the K-factor to apply it with.
///
/// Swapped verdicts are first mapped back into the pair's real orientation,
/// so a swapped "A" names the pair's second member. A pair with no verdict
/// in either direction produces no outcome. A failed direction counts as a
/// tie; agreement keeps the shared outcome at high confidence, disagreement
/// forces a low-confidence draw.
fn debias(
    forward: Option<PairwiseVerdict>,
    swapped: Option<PairwiseVerdict>,
    k_high: f64,
    k_low: f64,
) -> Option<(MatchOutcome, f64)> {
    let forward = forward.map(|v| match v {
        PairwiseVerdict::ModelA => MatchOutcome::WinnerA,
        PairwiseVerdict::ModelB => MatchOutcome::WinnerB,
        PairwiseVerdict::Tie => MatchOutcome::Draw,
    });
    let swapped = swapped.map(|v| match v {
        PairwiseVerdict::ModelA => MatchOutcome::WinnerB,
        PairwiseVerdict::ModelB => MatchOutcome::WinnerA,
        PairwiseVerdict::Tie => MatchOutcome::Draw,
    });

    if forward.is_none() && swapped.is_none() {
        return None;
    }

    let forward = forward.unwrap_or(MatchOutcome::Draw);
    let swapped = swapped.unwrap_or(MatchOutcome::Draw);
    if forward == swapped {
        Some((forward, k_high))
    } else {
        Some((MatchOutcome::Draw, k_low))
    }
}

#[async_trait]
impl ConsensusStrategy for EloRankingStrategy {
    fn name(&self) -> &'static str {
        "elo-ranking"
    }

    fn min_responses(&self) -> usize {
        Self::MIN_RESPONSES
    }

    async fn rank_responses(
        &self,
        responses: &[ModelResponse],
        prompt: &str,
    ) -> Result<Vec<RankingResult>, ConsensusError> {
        self.ensure_enough_responses(responses)?;
        check_cancelled(&self.cancellation_token)?;

        let pair_list = all_pairs(responses.len());
        info!(
            "Elo ranking: {} responses, {} pairs",
            responses.len(),
            pair_list.len()
        );

        // Judge prompts carry answer texts only; the judge never sees which
        // model wrote what
        let mut join_set = JoinSet::new();
        for (slot, &(a, b)) in pair_list.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let judge = self.models.judge.clone();
            let forward_prompt = PromptTemplate::pairwise_judgment(
                prompt,
                &responses[a].content,
                &responses[b].content,
            );
            let swapped_prompt = PromptTemplate::pairwise_judgment(
                prompt,
                &responses[b].content,
                &responses[a].content,
            );
            let call_timeout = self.call_timeout;

            join_set.spawn(async move {
                let forward =
                    complete_text(provider.as_ref(), &judge, &forward_prompt, call_timeout, &None);
                let swapped =
                    complete_text(provider.as_ref(), &judge, &swapped_prompt, call_timeout, &None);
                let (forward, swapped) = tokio::join!(forward, swapped);
                (slot, forward, swapped)
            });
        }

        let mut outcomes: Vec<Option<(MatchOutcome, f64)>> = vec![None; pair_list.len()];
        loop {
            let result = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        join_set.abort_all();
                        return Err(ConsensusError::Cancelled);
                    }
                    result = join_set.join_next() => result,
                }
            } else {
                join_set.join_next().await
            };

            let Some(result) = result else {
                break;
            };

            match result {
                Ok((slot, forward, swapped)) => {
                    let (a, b) = pair_list[slot];
                    let forward = settle_verdict(forward, "Forward", a, b);
                    let swapped = settle_verdict(swapped, "Swapped", a, b);
                    match debias(forward, swapped, self.config.k_high, self.config.k_low) {
                        Some(outcome) => outcomes[slot] = Some(outcome),
                        None => warn!("Pair ({}, {}) has no verdict at all, skipping it", a, b),
                    }
                }
                Err(e) => warn!("Pairwise judge task failed to join: {}", e),
            }
        }

        // Sequential reduce in pair order keeps ratings deterministic
        let mut table = EloTable::with_initial(
            responses.iter().map(|r| r.model_id.as_str()),
            self.config.initial_rating,
        );
        for (slot, outcome) in outcomes.into_iter().enumerate() {
            let Some((outcome, k)) = outcome else {
                continue;
            };
            let (a, b) = pair_list[slot];
            table.apply(&responses[a].model_id, &responses[b].model_id, outcome, k);
        }

        Ok(table.rankings())
    }

    async fn generate_consensus(
        &self,
        responses: &[ModelResponse],
        top_n: Option<usize>,
        prompt: &str,
    ) -> Result<String, ConsensusError> {
        let rankings = self.rank_responses(responses, prompt).await?;

        let top_n = resolve_top_n(top_n, self.config.default_top_n, rankings.len());
        let candidates: Vec<String> = rankings
            .iter()
            .take(top_n)
            .filter_map(|ranking| responses.iter().find(|r| r.model_id == ranking.model_id))
            .map(|r| r.content.clone())
            .collect();

        let synthesis_prompt = PromptTemplate::anonymous_synthesis(prompt, &candidates);
        match complete_text(
            self.provider.as_ref(),
            &self.models.summarizer,
            &synthesis_prompt,
            self.call_timeout,
            &self.cancellation_token,
        )
        .await
        {
            Ok(text) => Ok(text),
            Err(CallError::Cancelled) => Err(ConsensusError::Cancelled),
            Err(CallError::Provider(e)) => {
                warn!("Consensus synthesis call failed: {}", e);
                Ok(SYNTHESIS_FAILURE.to_string())
            }
        }
    }
}
