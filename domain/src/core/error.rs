//! Domain error types

use thiserror::Error;

/// Errors a consensus strategy can fail with.
///
/// Only two things abort a consensus run: a violated precondition (too few
/// responses to make the protocol meaningful) and an explicit cancellation.
/// Individual judge or summarizer failures degrade to safe defaults at the
/// call site and never surface here.
#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("{strategy} requires at least {required} responses, got {actual}")]
    TooFewResponses {
        strategy: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl ConsensusError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConsensusError::Cancelled)
    }
}
