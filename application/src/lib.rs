//! Application layer for the consensus engine
//!
//! This crate contains the strategy implementations, the provider and
//! progress ports they run against, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod strategies;

// Re-export commonly used types
pub use config::StrategyModels;
pub use ports::{
    ai_provider::{AiProvider, CompletionEvent, CompletionHandle, ProviderError, TokenUsage},
    progress::{NoProgress, ProgressNotifier},
};
pub use strategies::{
    CouncilConfig, CouncilStrategy, EloRankingConfig, EloRankingStrategy, MajorityVoteConfig,
    MajorityVoteStrategy,
};
