//! Council debate consensus strategy.
//!
//! Responses debate each other through five phases: critique, rebuttal,
//! peer validity judgment, a pairwise ranking tournament over the surviving
//! branches, and a final summary. The whole exchange is recorded in a
//! [`CouncilDebateTree`] that callers can inspect after the fact.
//!
//! Judges are the participants themselves. Critiques and rebuttals run
//! concurrently within their phase; the tournament runs sequentially so
//! ratings stay deterministic.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ensemble_domain::{
    ConsensusError, ConsensusStrategy, CouncilBranch, CouncilDebateTree, CouncilPhase, Critique,
    DebateMetadata, EloTable, INITIAL_RATING, K_HIGH_CONFIDENCE, MatchOutcome, ModelResponse,
    PairwiseVerdict, PeerVote, PromptTemplate, RankingResult, parse_pairwise_verdict,
    parse_validity_judgment, resolve_top_n,
};

use crate::config::StrategyModels;
use crate::ports::ai_provider::AiProvider;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::strategies::shared::{CallError, check_cancelled, complete_text};

/// Returned in place of a summary when the summarizer call fails.
const SUMMARY_FAILURE: &str = "Failed to generate council summary.";

/// Tuning knobs for the council debate.
#[derive(Debug, Clone)]
pub struct CouncilConfig {
    /// Fraction of participants that must vote a branch valid, counted
    /// against the full participant count.
    pub validity_threshold: f64,
    /// How many top-ranked branches feed the summary when the caller does
    /// not say.
    pub default_top_k: usize,
    /// Rating every branch starts from.
    pub initial_rating: f64,
    /// K-factor for decisive tournament outcomes. Ties and failed judge
    /// calls leave the ratings untouched.
    pub tournament_k: f64,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            validity_threshold: 0.5,
            default_top_k: 3,
            initial_rating: INITIAL_RATING,
            tournament_k: K_HIGH_CONFIDENCE,
        }
    }
}

/// Runs a five-phase adversarial debate between the responses and
/// synthesizes a consensus from the branches that survive it.
pub struct CouncilStrategy {
    provider: Arc<dyn AiProvider>,
    models: StrategyModels,
    config: CouncilConfig,
    call_timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
    progress: Arc<dyn ProgressNotifier>,
    last_debate: Mutex<Option<CouncilDebateTree>>,
}

impl CouncilStrategy {
    pub const MIN_RESPONSES: usize = 3;

    pub fn new(provider: Arc<dyn AiProvider>, models: StrategyModels) -> Self {
        Self {
            provider,
            models,
            config: CouncilConfig::default(),
            call_timeout: None,
            cancellation_token: None,
            progress: Arc::new(NoProgress),
            last_debate: Mutex::new(None),
        }
    }

    pub fn with_config(mut self, config: CouncilConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a per-call timeout. Timed-out calls degrade like any other
    /// failed call in their phase.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Sets a cancellation token for aborting mid-debate.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Sets a notifier that observes phase boundaries while a debate runs.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    /// The full debate record of the most recent completed run, if any.
    pub fn last_debate_tree(&self) -> Option<CouncilDebateTree> {
        self.last_debate.lock().ok().and_then(|guard| guard.clone())
    }

    /// Runs the debate and returns the full tree instead of just the
    /// summary text. The tree is also retained for [`Self::last_debate_tree`].
    pub async fn generate_consensus_with_debate_tree(
        &self,
        responses: &[ModelResponse],
        top_n: Option<usize>,
        prompt: &str,
    ) -> Result<CouncilDebateTree, ConsensusError> {
        self.ensure_enough_responses(responses)?;
        check_cancelled(&self.cancellation_token)?;

        let tree = self.run_debate(responses, top_n, prompt).await?;
        if let Ok(mut guard) = self.last_debate.lock() {
            *guard = Some(tree.clone());
        }
        Ok(tree)
    }

    async fn run_debate(
        &self,
        responses: &[ModelResponse],
        top_n: Option<usize>,
        prompt: &str,
    ) -> Result<CouncilDebateTree, ConsensusError> {
        let started = Instant::now();
        let mut branches: Vec<CouncilBranch> = responses
            .iter()
            .map(|r| CouncilBranch::from_response(r, self.config.initial_rating))
            .collect();

        info!("Council debate: {} participants", branches.len());

        self.phase_critique(&mut branches, prompt).await?;
        self.phase_rebuttal(&mut branches, prompt).await?;
        self.phase_judgment(&mut branches, prompt).await?;
        let rankings = self.phase_ranking(&mut branches, prompt).await?;
        let top_k = resolve_top_n(top_n, self.config.default_top_k, rankings.len());
        let summary = self.phase_summary(&branches, &rankings, top_k, prompt).await?;

        let valid_branch_ids: Vec<String> = branches
            .iter()
            .filter(|b| b.is_valid)
            .map(|b| b.model_id.clone())
            .collect();
        let metadata = DebateMetadata {
            model_count: branches.len(),
            valid_count: valid_branch_ids.len(),
            validity_threshold: self.config.validity_threshold,
            top_k,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        Ok(CouncilDebateTree {
            prompt: prompt.to_string(),
            branches,
            valid_branch_ids,
            rankings,
            summary,
            metadata,
        })
    }

    /// Critique phase: every participant reviews every other participant's
    /// initial answer. Failed critique calls are dropped; the target simply
    /// receives fewer critiques.
    async fn phase_critique(
        &self,
        branches: &mut [CouncilBranch],
        prompt: &str,
    ) -> Result<(), ConsensusError> {
        check_cancelled(&self.cancellation_token)?;
        let count = branches.len();
        self.progress.on_phase(
            CouncilPhase::Critique,
            0.0,
            &format!("{} participants critiquing each other", count),
        );

        let mut join_set = JoinSet::new();
        for critic_idx in 0..count {
            for target_idx in 0..count {
                if critic_idx == target_idx {
                    continue;
                }
                let provider = Arc::clone(&self.provider);
                let critic_id = branches[critic_idx].model_id.clone();
                let critique_prompt = PromptTemplate::critique(
                    prompt,
                    &branches[target_idx].model_id,
                    &branches[target_idx].initial_answer,
                );
                let call_timeout = self.call_timeout;

                join_set.spawn(async move {
                    let result = complete_text(
                        provider.as_ref(),
                        &critic_id,
                        &critique_prompt,
                        call_timeout,
                        &None,
                    )
                    .await;
                    (critic_idx, target_idx, critic_id, result)
                });
            }
        }

        let mut collected: Vec<(usize, usize, Critique)> = Vec::new();
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
                Ok((critic_idx, target_idx, critic_id, Ok(text))) => {
                    collected.push((target_idx, critic_idx, Critique::new(critic_id, text)));
                }
                Ok((_, target_idx, critic_id, Err(e))) => {
                    warn!(
                        "Critique from {} on {} failed, dropping it: {}",
                        critic_id, branches[target_idx].model_id, e
                    );
                }
                Err(e) => warn!("Critique task failed to join: {}", e),
            }
        }

        // Attach in (target, critic) order regardless of completion order
        collected.sort_by_key(|(target_idx, critic_idx, _)| (*target_idx, *critic_idx));
        for (target_idx, _, critique) in collected {
            branches[target_idx].record_critique(critique);
        }

        self.progress
            .on_phase(CouncilPhase::Critique, 1.0, "Critique round complete");
        Ok(())
    }

    /// Rebuttal phase: every participant answers the critiques against its
    /// own branch. A failed call leaves the branch without a rebuttal.
    async fn phase_rebuttal(
        &self,
        branches: &mut [CouncilBranch],
        prompt: &str,
    ) -> Result<(), ConsensusError> {
        check_cancelled(&self.cancellation_token)?;
        self.progress.on_phase(
            CouncilPhase::Rebuttal,
            0.0,
            &format!("{} participants writing rebuttals", branches.len()),
        );

        let mut join_set = JoinSet::new();
        for (idx, branch) in branches.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let model_id = branch.model_id.clone();
            let critique_pairs: Vec<(String, String)> = branch
                .critiques
                .iter()
                .map(|c| (c.critic_id.clone(), c.content.clone()))
                .collect();
            let rebuttal_prompt =
                PromptTemplate::rebuttal(prompt, &branch.initial_answer, &critique_pairs);
            let call_timeout = self.call_timeout;

            join_set.spawn(async move {
                let result = complete_text(
                    provider.as_ref(),
                    &model_id,
                    &rebuttal_prompt,
                    call_timeout,
                    &None,
                )
                .await;
                (idx, model_id, result)
            });
        }

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
                Ok((idx, _, Ok(text))) => branches[idx].rebuttal = Some(text),
                Ok((_, model_id, Err(e))) => {
                    warn!("Rebuttal from {} failed, keeping its initial answer: {}", model_id, e);
                }
                Err(e) => warn!("Rebuttal task failed to join: {}", e),
            }
        }

        self.progress
            .on_phase(CouncilPhase::Rebuttal, 1.0, "Rebuttal round complete");
        Ok(())
    }

    /// Judgment phase: every participant votes on every other branch's
    /// validity after the exchange. Failed calls and unreadable replies
    /// count as valid votes, so a flaky judge cannot sink a branch.
    async fn phase_judgment(
        &self,
        branches: &mut [CouncilBranch],
        prompt: &str,
    ) -> Result<(), ConsensusError> {
        check_cancelled(&self.cancellation_token)?;
        let count = branches.len();
        self.progress.on_phase(
            CouncilPhase::Judgment,
            0.0,
            &format!("{} participants voting on validity", count),
        );

        let mut join_set = JoinSet::new();
        for target_idx in 0..count {
            let target = &branches[target_idx];
            let critique_pairs: Vec<(String, String)> = target
                .critiques
                .iter()
                .map(|c| (c.critic_id.clone(), c.content.clone()))
                .collect();
            let judgment_prompt = PromptTemplate::validity_judgment(
                prompt,
                &target.model_id,
                &target.initial_answer,
                &critique_pairs,
                target.rebuttal.as_deref(),
            );

            for voter_idx in 0..count {
                if voter_idx == target_idx {
                    continue;
                }
                let provider = Arc::clone(&self.provider);
                let voter_id = branches[voter_idx].model_id.clone();
                let judgment_prompt = judgment_prompt.clone();
                let call_timeout = self.call_timeout;

                join_set.spawn(async move {
                    let result = complete_text(
                        provider.as_ref(),
                        &voter_id,
                        &judgment_prompt,
                        call_timeout,
                        &None,
                    )
                    .await;
                    (voter_idx, target_idx, voter_id, result)
                });
            }
        }

        let mut collected: Vec<(usize, usize, PeerVote)> = Vec::new();
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
                Ok((voter_idx, target_idx, voter_id, result)) => {
                    let judgment = match result {
                        Ok(raw) => parse_validity_judgment(&raw),
                        Err(e) => {
                            warn!(
                                "Validity vote from {} failed, counting it as valid: {}",
                                voter_id, e
                            );
                            Default::default()
                        }
                    };
                    collected.push((
                        target_idx,
                        voter_idx,
                        PeerVote::new(voter_id, judgment.is_valid, judgment.reasoning),
                    ));
                }
                Err(e) => warn!("Judgment task failed to join: {}", e),
            }
        }

        collected.sort_by_key(|(target_idx, voter_idx, _)| (*target_idx, *voter_idx));
        for (target_idx, _, vote) in collected {
            branches[target_idx].record_vote(vote);
        }

        for branch in branches.iter_mut() {
            branch.settle_validity(count, self.config.validity_threshold);
        }
        let valid_count = branches.iter().filter(|b| b.is_valid).count();
        if valid_count == 0 {
            warn!("No branch met the validity threshold, promoting all {} branches", count);
            for branch in branches.iter_mut() {
                branch.is_valid = true;
            }
        }

        let settled = branches.iter().filter(|b| b.is_valid).count();
        self.progress.on_phase(
            CouncilPhase::Judgment,
            1.0,
            &format!("{} of {} branches held up", settled, count),
        );
        Ok(())
    }

    /// Ranking phase: a sequential pairwise tournament over the valid
    /// branches, judged over their refined content by the participants in
    /// rotation. Only decisive verdicts move ratings.
    async fn phase_ranking(
        &self,
        branches: &mut [CouncilBranch],
        prompt: &str,
    ) -> Result<Vec<RankingResult>, ConsensusError> {
        check_cancelled(&self.cancellation_token)?;
        let valid_indices: Vec<usize> = branches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_valid)
            .map(|(idx, _)| idx)
            .collect();
        self.progress.on_phase(
            CouncilPhase::Ranking,
            0.0,
            &format!("Tournament over {} valid branches", valid_indices.len()),
        );

        let mut table = EloTable::with_initial(
            valid_indices.iter().map(|&idx| branches[idx].model_id.as_str()),
            self.config.initial_rating,
        );

        let participant_count = branches.len();
        let mut pair_index = 0usize;
        for (pos, &a) in valid_indices.iter().enumerate() {
            for &b in &valid_indices[pos + 1..] {
                check_cancelled(&self.cancellation_token)?;
                let judge_id = branches[pair_index % participant_count].model_id.clone();
                let pair_prompt = PromptTemplate::pairwise_judgment(
                    prompt,
                    branches[a].refined_content(),
                    branches[b].refined_content(),
                );

                let verdict = match complete_text(
                    self.provider.as_ref(),
                    &judge_id,
                    &pair_prompt,
                    self.call_timeout,
                    &self.cancellation_token,
                )
                .await
                {
                    Ok(raw) => parse_pairwise_verdict(&raw),
                    Err(CallError::Cancelled) => return Err(ConsensusError::Cancelled),
                    Err(CallError::Provider(e)) => {
                        debug!("Tournament judge call for pair ({}, {}) failed: {}", a, b, e);
                        None
                    }
                };

                match verdict {
                    Some(PairwiseVerdict::ModelA) => table.apply(
                        &branches[a].model_id,
                        &branches[b].model_id,
                        MatchOutcome::WinnerA,
                        self.config.tournament_k,
                    ),
                    Some(PairwiseVerdict::ModelB) => table.apply(
                        &branches[a].model_id,
                        &branches[b].model_id,
                        MatchOutcome::WinnerB,
                        self.config.tournament_k,
                    ),
                    Some(PairwiseVerdict::Tie) | None => {
                        debug!("No decisive verdict for pair ({}, {}), ratings unchanged", a, b);
                    }
                }
                pair_index += 1;
            }
        }

        let rankings = table.rankings();
        for ranking in &rankings {
            if let Some(branch) = branches.iter_mut().find(|b| b.model_id == ranking.model_id) {
                branch.elo_score = ranking.elo_score;
                branch.rank = Some(ranking.rank);
            }
        }

        self.progress
            .on_phase(CouncilPhase::Ranking, 1.0, "Tournament ranking complete");
        Ok(rankings)
    }

    /// Summary phase: one summarizer call over the refined content of the
    /// top-ranked branches, presented anonymously.
    async fn phase_summary(
        &self,
        branches: &[CouncilBranch],
        rankings: &[RankingResult],
        top_k: usize,
        prompt: &str,
    ) -> Result<String, ConsensusError> {
        check_cancelled(&self.cancellation_token)?;
        self.progress.on_phase(
            CouncilPhase::Summary,
            0.0,
            &format!("Synthesizing top {} branches", top_k),
        );

        let candidates: Vec<String> = rankings
            .iter()
            .take(top_k)
            .filter_map(|ranking| branches.iter().find(|b| b.model_id == ranking.model_id))
            .map(|b| b.refined_content().to_string())
            .collect();

        let summary_prompt = PromptTemplate::anonymous_synthesis(prompt, &candidates);
        let summary = match complete_text(
            self.provider.as_ref(),
            &self.models.summarizer,
            &summary_prompt,
            self.call_timeout,
            &self.cancellation_token,
        )
        .await
        {
            Ok(text) => text,
            Err(CallError::Cancelled) => return Err(ConsensusError::Cancelled),
            Err(CallError::Provider(e)) => {
                warn!("Council summary call failed: {}", e);
                SUMMARY_FAILURE.to_string()
            }
        };

        self.progress
            .on_phase(CouncilPhase::Summary, 1.0, "Summary complete");
        Ok(summary)
    }
}

#[async_trait]
impl ConsensusStrategy for CouncilStrategy {
    fn name(&self) -> &'static str {
        "council"
    }

    fn min_responses(&self) -> usize {
        Self::MIN_RESPONSES
    }

    async fn rank_responses(
        &self,
        responses: &[ModelResponse],
        prompt: &str,
    ) -> Result<Vec<RankingResult>, ConsensusError> {
        let tree = self
            .generate_consensus_with_debate_tree(responses, None, prompt)
            .await?;
        Ok(tree.rankings)
    }

    async fn generate_consensus(
        &self,
        responses: &[ModelResponse],
        top_n: Option<usize>,
        prompt: &str,
    ) -> Result<String, ConsensusError> {
        let tree = self
            .generate_consensus_with_debate_tree(responses, top_n, prompt)
            .await?;
        Ok(tree.summary)
    }
}
