//! Majority-vote consensus strategy.
//!
//! One judge call scores every candidate's alignment with the position most
//! candidates share; the synthesis is anchored on the top-ranked model's
//! answer. Cheap (two calls total) but sensitive to the judge model's
//! reliability, since a single unparseable reply flattens the ranking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ensemble_domain::{
    ConsensusError, ConsensusStrategy, ModelResponse, PromptTemplate, RankingResult, assign_ranks,
    parse_alignment_scores, resolve_top_n,
};

use crate::config::StrategyModels;
use crate::ports::ai_provider::AiProvider;
use crate::strategies::shared::{CallError, check_cancelled, complete_text};

/// Returned in place of a synthesis when the summarizer call fails.
const SYNTHESIS_FAILURE: &str = "Failed to generate majority consensus summary.";

/// Tuning knobs for majority voting.
#[derive(Debug, Clone)]
pub struct MajorityVoteConfig {
    /// How many top-ranked responses feed the synthesis when the caller
    /// does not say.
    pub default_top_n: usize,
}

impl Default for MajorityVoteConfig {
    fn default() -> Self {
        Self { default_top_n: 3 }
    }
}

/// Ranks candidate responses with a single alignment-scoring judge call and
/// synthesizes a consensus anchored on the majority position.
pub struct MajorityVoteStrategy {
    provider: Arc<dyn AiProvider>,
    models: StrategyModels,
    config: MajorityVoteConfig,
    call_timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl MajorityVoteStrategy {
    pub const MIN_RESPONSES: usize = 2;

    pub fn new(provider: Arc<dyn AiProvider>, models: StrategyModels) -> Self {
        Self {
            provider,
            models,
            config: MajorityVoteConfig::default(),
            call_timeout: None,
            cancellation_token: None,
        }
    }

    pub fn with_config(mut self, config: MajorityVoteConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a per-call timeout. A timed-out judge call degrades to an
    /// all-zero ranking instead of failing the invocation.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Sets a cancellation token for aborting mid-flight.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Runs the alignment judge call and reduces its output to one score per
    /// response, in response order.
    ///
    /// Judge entries are taken first-occurrence-wins, entries for unknown
    /// ids are dropped, responses the judge omitted score 0.0, and every
    /// score is clamped to [0.0, 100.0]. A failed or unparseable judge call
    /// scores everything 0.0, which leaves the ranking in response order.
    async fn score_candidates(
        &self,
        responses: &[ModelResponse],
        prompt: &str,
    ) -> Result<Vec<(String, f64)>, ConsensusError> {
        let candidates: Vec<(String, String)> = responses
            .iter()
            .map(|r| (r.model_id.clone(), r.content.clone()))
            .collect();
        let judge_prompt = PromptTemplate::alignment_ranking(prompt, &candidates);

        let raw = match complete_text(
            self.provider.as_ref(),
            &self.models.judge,
            &judge_prompt,
            self.call_timeout,
            &self.cancellation_token,
        )
        .await
        {
            Ok(raw) => raw,
            Err(CallError::Cancelled) => return Err(ConsensusError::Cancelled),
            Err(CallError::Provider(e)) => {
                warn!("Alignment judge call failed, scoring all candidates 0: {}", e);
                return Ok(zero_scores(responses));
            }
        };

        let Some(parsed) = parse_alignment_scores(&raw) else {
            warn!("Alignment judge output was not parseable, scoring all candidates 0");
            return Ok(zero_scores(responses));
        };

        let known: HashSet<&str> = responses.iter().map(|r| r.model_id.as_str()).collect();
        let mut by_id = HashMap::new();
        for entry in parsed {
            if !known.contains(entry.model_id.as_str()) {
                debug!("Dropping judge score for unknown id {}", entry.model_id);
                continue;
            }
            // First occurrence wins on duplicate ids
            by_id
                .entry(entry.model_id)
                .or_insert(entry.alignment_score.clamp(0.0, 100.0));
        }

        Ok(responses
            .iter()
            .map(|r| {
                let score = by_id.get(&r.model_id).copied().unwrap_or(0.0);
                (r.model_id.clone(), score)
            })
            .collect())
    }
}

fn zero_scores(responses: &[ModelResponse]) -> Vec<(String, f64)> {
    responses.iter().map(|r| (r.model_id.clone(), 0.0)).collect()
}

#[async_trait]
impl ConsensusStrategy for MajorityVoteStrategy {
    fn name(&self) -> &'static str {
        "majority-vote"
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

        info!("Majority vote: scoring {} responses", responses.len());
        let scored = self.score_candidates(responses, prompt).await?;
        Ok(assign_ranks(scored))
    }

    async fn generate_consensus(
        &self,
        responses: &[ModelResponse],
        top_n: Option<usize>,
        prompt: &str,
    ) -> Result<String, ConsensusError> {
        let rankings = self.rank_responses(responses, prompt).await?;

        let top_n = resolve_top_n(top_n, self.config.default_top_n, rankings.len());
        let anchor_id = rankings[0].model_id.clone();
        let selected: Vec<(String, String)> = rankings
            .iter()
            .take(top_n)
            .filter_map(|ranking| {
                responses
                    .iter()
                    .find(|r| r.model_id == ranking.model_id)
                    .map(|r| (r.model_id.clone(), r.content.clone()))
            })
            .collect();

        let synthesis_prompt = PromptTemplate::majority_synthesis(prompt, &anchor_id, &selected);
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
                warn!("Majority synthesis call failed: {}", e);
                Ok(SYNTHESIS_FAILURE.to_string())
            }
        }
    }
}
