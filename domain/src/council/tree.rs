//! Council debate phases and the debate tree

use std::fmt;

use serde::{Deserialize, Serialize};

use super::branch::CouncilBranch;
use crate::ranking::result::RankingResult;

/// The five phases of a council debate, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouncilPhase {
    Critique,
    Rebuttal,
    Judgment,
    Ranking,
    Summary,
}

impl CouncilPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouncilPhase::Critique => "critique",
            CouncilPhase::Rebuttal => "rebuttal",
            CouncilPhase::Judgment => "judgment",
            CouncilPhase::Ranking => "ranking",
            CouncilPhase::Summary => "summary",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CouncilPhase::Critique => "Critique Round",
            CouncilPhase::Rebuttal => "Rebuttal Round",
            CouncilPhase::Judgment => "Judgment Round",
            CouncilPhase::Ranking => "Tournament Ranking",
            CouncilPhase::Summary => "Summary",
        }
    }
}

impl fmt::Display for CouncilPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Run-level facts recorded alongside a debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateMetadata {
    pub model_count: usize,
    pub valid_count: usize,
    pub validity_threshold: f64,
    pub top_k: usize,
    pub duration_ms: u64,
}

/// The full record of one council debate: every branch with its critiques,
/// rebuttal and votes, which branches survived validity judgment, the final
/// rankings, and the synthesized summary.
///
/// Built once per invocation and returned to the caller; the strategy also
/// keeps the most recent tree for its `last_debate_tree` getter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilDebateTree {
    pub prompt: String,
    pub branches: Vec<CouncilBranch>,
    pub valid_branch_ids: Vec<String>,
    pub rankings: Vec<RankingResult>,
    pub summary: String,
    pub metadata: DebateMetadata,
}

impl CouncilDebateTree {
    pub fn branch(&self, model_id: &str) -> Option<&CouncilBranch> {
        self.branches.iter().find(|b| b.model_id == model_id)
    }

    pub fn valid_branches(&self) -> impl Iterator<Item = &CouncilBranch> {
        self.branches.iter().filter(|b| b.is_valid)
    }
}
