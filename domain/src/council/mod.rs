//! Council debate state: branches, phases, and the debate tree.
//!
//! - [`branch::CouncilBranch`]: per-participant state mutated through the
//!   debate phases
//! - [`tree::CouncilDebateTree`]: the full inspectable record of one debate

pub mod branch;
pub mod tree;
