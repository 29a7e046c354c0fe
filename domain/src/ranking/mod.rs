//! Ranking primitives shared by every strategy.
//!
//! - [`result::RankingResult`]: one model's final position and score
//! - [`elo::EloTable`]: pairwise tournament rating bookkeeping

pub mod elo;
pub mod result;
