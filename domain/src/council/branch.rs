//! Council debate branches

use serde::{Deserialize, Serialize};

use crate::core::response::ModelResponse;

/// A critique received from another participant. `critic_id` names the
/// author; the critique always lives on the target's branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Critique {
    pub critic_id: String,
    pub content: String,
}

impl Critique {
    pub fn new(critic_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            critic_id: critic_id.into(),
            content: content.into(),
        }
    }
}

/// A structured validity vote cast by a peer during the judgment phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerVote {
    pub voter_id: String,
    pub is_valid: bool,
    pub reasoning: String,
}

impl PeerVote {
    pub fn new(voter_id: impl Into<String>, is_valid: bool, reasoning: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            is_valid,
            reasoning: reasoning.into(),
        }
    }
}

/// Per-participant debate state.
///
/// One branch is created per ensemble member at the start of a debate and
/// mutated in place as the phases run: critiques and votes accumulate,
/// the rebuttal lands after the rebuttal phase, validity is settled after
/// judgment, and the rating/rank after the tournament. Branches are never
/// shared across debates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilBranch {
    pub model_id: String,
    pub model_name: String,
    pub initial_answer: String,
    pub critiques: Vec<Critique>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuttal: Option<String>,
    pub votes: Vec<PeerVote>,
    pub valid_vote_count: usize,
    pub is_valid: bool,
    pub elo_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl CouncilBranch {
    pub fn from_response(response: &ModelResponse, initial_rating: f64) -> Self {
        Self {
            model_id: response.model_id.clone(),
            model_name: response.model_name.clone(),
            initial_answer: response.content.clone(),
            critiques: Vec::new(),
            rebuttal: None,
            votes: Vec::new(),
            valid_vote_count: 0,
            is_valid: false,
            elo_score: initial_rating,
            rank: None,
        }
    }

    pub fn record_critique(&mut self, critique: Critique) {
        self.critiques.push(critique);
    }

    /// Record a peer vote, keeping `valid_vote_count` in sync with the vote
    /// list.
    pub fn record_vote(&mut self, vote: PeerVote) {
        if vote.is_valid {
            self.valid_vote_count += 1;
        }
        self.votes.push(vote);
    }

    /// Settle `is_valid` from the votes received so far:
    /// `valid_vote_count / total_participants >= threshold`. The denominator
    /// is the full participant count, not the number of votes received.
    pub fn settle_validity(&mut self, total_participants: usize, threshold: f64) {
        if total_participants == 0 {
            self.is_valid = false;
            return;
        }
        let ratio = self.valid_vote_count as f64 / total_participants as f64;
        self.is_valid = ratio >= threshold;
    }

    /// The text later phases argue over and synthesize from: the rebuttal
    /// when one was produced, otherwise the initial answer.
    pub fn refined_content(&self) -> &str {
        self.rebuttal.as_deref().unwrap_or(&self.initial_answer)
    }
}
