//! Ranking results and rank assignment

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One model's position after a strategy has ranked the ensemble.
///
/// `elo_score` is the generic rank score: a 0-100 alignment score for
/// majority voting, an Elo rating for the tournament strategies. `rank` is
/// 1-based and assigned by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult {
    pub model_id: String,
    pub elo_score: f64,
    pub rank: usize,
}

impl RankingResult {
    pub fn new(model_id: impl Into<String>, elo_score: f64, rank: usize) -> Self {
        Self {
            model_id: model_id.into(),
            elo_score,
            rank,
        }
    }
}

/// Sort `(model_id, score)` pairs by descending score and assign 1-based
/// ranks. The sort is stable, so equal scores keep their input order; callers
/// build the list in response order to get the documented tie-break.
pub fn assign_ranks(scored: Vec<(String, f64)>) -> Vec<RankingResult> {
    let mut scored = scored;
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (model_id, score))| RankingResult::new(model_id, score, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_descending_by_score() {
        let ranked = assign_ranks(vec![
            ("a".to_string(), 10.0),
            ("b".to_string(), 90.0),
            ("c".to_string(), 50.0),
        ]);

        assert_eq!(ranked[0].model_id, "b");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].model_id, "c");
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[2].model_id, "a");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = assign_ranks(vec![
            ("first".to_string(), 0.0),
            ("second".to_string(), 0.0),
            ("third".to_string(), 0.0),
        ]);

        let ids: Vec<&str> = ranked.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_serializes_elo_score_as_camel_case() {
        let result = RankingResult::new("m", 1216.0, 1);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"eloScore\":1216.0"));
        assert!(json.contains("\"modelId\":\"m\""));
    }
}
