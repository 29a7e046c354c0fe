//! Domain layer for ensemble-consensus
//!
//! This crate contains the core types and logic of the consensus engine.
//! It has no dependencies on provider transports or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Ranking
//!
//! Given several independent answers to the same prompt, a strategy ranks
//! them by estimated quality:
//!
//! - **Majority voting**: one judge scores every candidate's alignment
//! - **Elo tournament**: all pairs judged twice with positions swapped to
//!   cancel out position bias, ratings folded in afterwards
//!
//! ## Council debate
//!
//! The council strategy runs an adversarial debate (critique, rebuttal,
//! judgment, tournament, summary) over per-participant branches and records
//! the whole exchange in an inspectable debate tree.

pub mod core;
pub mod council;
pub mod parsing;
pub mod prompt;
pub mod ranking;
pub mod strategy;

// Re-export commonly used types
pub use core::{error::ConsensusError, response::ModelResponse};
pub use council::{
    branch::{CouncilBranch, Critique, PeerVote},
    tree::{CouncilDebateTree, CouncilPhase, DebateMetadata},
};
pub use prompt::PromptTemplate;
pub use ranking::{
    elo::{EloTable, INITIAL_RATING, K_HIGH_CONFIDENCE, K_LOW_CONFIDENCE, MatchOutcome, expected_score},
    result::{RankingResult, assign_ranks},
};
pub use strategy::{ConsensusStrategy, resolve_top_n};

// Re-export parsing types
pub use parsing::{
    AlignmentScore, PairwiseVerdict, ValidityJudgment, extract_fenced_block, parse_alignment_scores,
    parse_json_lenient, parse_pairwise_verdict, parse_validity_judgment,
};
