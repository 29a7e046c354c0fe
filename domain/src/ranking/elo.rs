//! Elo rating bookkeeping for pairwise tournaments

use std::collections::HashMap;

use super::result::{RankingResult, assign_ranks};

/// Rating every participant starts a tournament with.
pub const INITIAL_RATING: f64 = 1200.0;

/// K-factor when both debiased judge calls agree on an outcome.
pub const K_HIGH_CONFIDENCE: f64 = 32.0;

/// K-factor for the forced tie recorded when the two calls disagree.
pub const K_LOW_CONFIDENCE: f64 = 16.0;

/// Outcome of one pairwise match, expressed in terms of the pair's
/// first ("A") and second ("B") member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    WinnerA,
    WinnerB,
    Draw,
}

/// Expected score of the first participant under the standard logistic
/// curve with divisor 400.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// In-memory rating table for one tournament.
///
/// Participants are registered up front at the initial rating; match results
/// are folded in one at a time with [`EloTable::apply`]. Insertion order is
/// remembered so that [`EloTable::rankings`] breaks rating ties by the order
/// participants were registered in.
#[derive(Debug, Clone)]
pub struct EloTable {
    ratings: HashMap<String, f64>,
    order: Vec<String>,
    initial: f64,
}

impl EloTable {
    pub fn new<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_initial(participants, INITIAL_RATING)
    }

    pub fn with_initial<I, S>(participants: I, initial: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ratings = HashMap::new();
        let mut order = Vec::new();
        for participant in participants {
            let id = participant.into();
            if ratings.insert(id.clone(), initial).is_none() {
                order.push(id);
            }
        }
        Self {
            ratings,
            order,
            initial,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Current rating for a participant, or the initial rating if the id was
    /// never registered.
    pub fn rating(&self, model_id: &str) -> f64 {
        self.ratings.get(model_id).copied().unwrap_or(self.initial)
    }

    /// Fold one match result into the table. New rating = old + K x (actual -
    /// expected), applied symmetrically to both participants. Unregistered
    /// ids leave the table untouched.
    pub fn apply(&mut self, a: &str, b: &str, outcome: MatchOutcome, k: f64) {
        let (Some(rating_a), Some(rating_b)) =
            (self.ratings.get(a).copied(), self.ratings.get(b).copied())
        else {
            return;
        };

        let expected_a = expected_score(rating_a, rating_b);
        let expected_b = 1.0 - expected_a;
        let (actual_a, actual_b) = match outcome {
            MatchOutcome::WinnerA => (1.0, 0.0),
            MatchOutcome::WinnerB => (0.0, 1.0),
            MatchOutcome::Draw => (0.5, 0.5),
        };

        self.ratings
            .insert(a.to_string(), rating_a + k * (actual_a - expected_a));
        self.ratings
            .insert(b.to_string(), rating_b + k * (actual_b - expected_b));
    }

    /// Final standings: descending rating, 1-based ranks, registration order
    /// on ties.
    pub fn rankings(&self) -> Vec<RankingResult> {
        let scored = self
            .order
            .iter()
            .map(|id| (id.clone(), self.rating(id)))
            .collect();
        assign_ranks(scored)
    }
}
