//! Core domain concepts shared across all strategies.
//!
//! - [`response::ModelResponse`]: one ensemble member's answer to the prompt
//! - [`error::ConsensusError`]: the errors a consensus run can fail with

pub mod error;
pub mod response;
