//! Lenient parsing of structured judge output.
//!
//! LLM judges are asked for strict JSON or a fixed verdict marker, and
//! routinely return it wrapped in prose or markdown fences. Every parser
//! here runs the same chain: direct parse, then the first fenced code
//! block, then a safe default. Unparseable judge output must never fail
//! a consensus run. Pure domain logic, no I/O.
//!
//! # Functions
//!
//! | Function | Use Case | Fallback |
//! |----------|----------|----------|
//! | [`parse_validity_judgment`] | Council validity votes | charitable `isValid: true` |
//! | [`parse_alignment_scores`] | Majority-vote ranking JSON | `None` (caller ranks all-zero) |
//! | [`parse_pairwise_verdict`] | Tournament `WINNER:` marker | `None` (caller skips or ties) |

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// A peer's structured verdict on a debated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityJudgment {
    pub is_valid: bool,
    #[serde(default)]
    pub reasoning: String,
}

impl Default for ValidityJudgment {
    /// The charitable default used when judge output cannot be parsed.
    fn default() -> Self {
        Self {
            is_valid: true,
            reasoning: String::new(),
        }
    }
}

/// One candidate's score from the majority-voting judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentScore {
    pub model_id: String,
    pub alignment_score: f64,
}

#[derive(Debug, Deserialize)]
struct AlignmentRanking {
    rankings: Vec<AlignmentScore>,
}

/// Verdict of one pairwise judge call, in terms of the anonymous labels the
/// judge saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairwiseVerdict {
    ModelA,
    ModelB,
    Tie,
}

/// Extract the body of the first fenced code block, preferring a
/// ```json-tagged fence over a plain one.
pub fn extract_fenced_block(raw: &str) -> Option<&str> {
    for marker in ["```json", "```"] {
        if let Some(start) = raw.find(marker) {
            let body = &raw[start + marker.len()..];
            if let Some(end) = body.find("```") {
                return Some(body[..end].trim());
            }
        }
    }
    None
}

/// The shared parser chain: direct JSON parse, then retry on the first
/// fenced code block. `None` means both stages failed.
pub fn parse_json_lenient<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str::<T>(raw.trim()) {
        return Some(value);
    }
    if let Some(block) = extract_fenced_block(raw)
        && let Ok(value) = serde_json::from_str::<T>(block)
    {
        return Some(value);
    }
    None
}

/// Parse a council validity vote. Falls back to the charitable default
/// (`isValid: true`, empty reasoning) when the chain fails.
pub fn parse_validity_judgment(raw: &str) -> ValidityJudgment {
    parse_json_lenient::<ValidityJudgment>(raw).unwrap_or_default()
}

/// Parse the majority-voting ranking JSON. Accepts the documented
/// `{"rankings": [...]}` wrapper or a bare array. Returns `None` on total
/// failure; the strategy then falls back to its deterministic all-zero
/// ranking.
pub fn parse_alignment_scores(raw: &str) -> Option<Vec<AlignmentScore>> {
    if let Some(wrapper) = parse_json_lenient::<AlignmentRanking>(raw) {
        return Some(wrapper.rankings);
    }
    parse_json_lenient::<Vec<AlignmentScore>>(raw)
}

/// Extract the final `WINNER: A | B | TIE` verdict from a pairwise judge
/// response. The judge is asked to reason first, so the *last* marker wins.
/// Tolerates markdown emphasis and a "Model A" spelling of the label.
pub fn parse_pairwise_verdict(raw: &str) -> Option<PairwiseVerdict> {
    let upper = raw.to_uppercase();
    let start = upper.rfind("WINNER")?;
    let tail = &upper[start + "WINNER".len()..];

    let mut token = tail.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    if let Some(rest) = token.strip_prefix("MODEL") {
        token = rest.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    }

    if token.starts_with("TIE") {
        Some(PairwiseVerdict::Tie)
    } else if token.starts_with('A') {
        Some(PairwiseVerdict::ModelA)
    } else if token.starts_with('B') {
        Some(PairwiseVerdict::ModelB)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_validity_judgment Tests ====================

    #[test]
    fn test_validity_direct_json() {
        let judgment = parse_validity_judgment(r#"{"isValid": false, "reasoning": "wrong sum"}"#);
        assert!(!judgment.is_valid);
        assert_eq!(judgment.reasoning, "wrong sum");
    }

    #[test]
    fn test_validity_fenced_json_block() {
        let response = r#"Here is my judgment:
```json
{"isValid": true, "reasoning": "holds up"}
```
"#;
        let judgment = parse_validity_judgment(response);
        assert!(judgment.is_valid);
        assert_eq!(judgment.reasoning, "holds up");
    }

    #[test]
    fn test_validity_plain_fenced_block() {
        let response = "```\n{\"isValid\": false, \"reasoning\": \"no\"}\n```";
        let judgment = parse_validity_judgment(response);
        assert!(!judgment.is_valid);
    }

    #[test]
    fn test_validity_missing_reasoning_defaults_empty() {
        let judgment = parse_validity_judgment(r#"{"isValid": false}"#);
        assert!(!judgment.is_valid);
        assert_eq!(judgment.reasoning, "");
    }

    #[test]
    fn test_validity_garbage_defaults_charitably() {
        let judgment = parse_validity_judgment("I think it's probably fine?");
        assert!(judgment.is_valid);
        assert_eq!(judgment.reasoning, "");
    }

    // ==================== parse_alignment_scores Tests ====================

    #[test]
    fn test_alignment_wrapper_object() {
        let response =
            r#"{"rankings": [{"modelId": "a", "alignmentScore": 90}, {"modelId": "b", "alignmentScore": 10}]}"#;
        let scores = parse_alignment_scores(response).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].model_id, "a");
        assert_eq!(scores[0].alignment_score, 90.0);
    }

    #[test]
    fn test_alignment_bare_array() {
        let response = r#"[{"modelId": "a", "alignmentScore": 55.5}]"#;
        let scores = parse_alignment_scores(response).unwrap();
        assert_eq!(scores[0].alignment_score, 55.5);
    }

    #[test]
    fn test_alignment_fenced_block() {
        let response = r#"Scores below.
```json
{"rankings": [{"modelId": "x", "alignmentScore": 42}]}
```
Hope that helps!"#;
        let scores = parse_alignment_scores(response).unwrap();
        assert_eq!(scores[0].model_id, "x");
    }

    #[test]
    fn test_alignment_garbage_is_none() {
        assert!(parse_alignment_scores("no json at all").is_none());
        assert!(parse_alignment_scores("").is_none());
    }

    // ==================== parse_pairwise_verdict Tests ====================

    #[test]
    fn test_verdict_plain_markers() {
        assert_eq!(
            parse_pairwise_verdict("WINNER: A"),
            Some(PairwiseVerdict::ModelA)
        );
        assert_eq!(
            parse_pairwise_verdict("WINNER: B"),
            Some(PairwiseVerdict::ModelB)
        );
        assert_eq!(
            parse_pairwise_verdict("WINNER: TIE"),
            Some(PairwiseVerdict::Tie)
        );
    }

    #[test]
    fn test_verdict_last_marker_wins() {
        let response = "If forced to guess early I would say WINNER: A.\n\
                        But B cites the correct formula.\n\nWINNER: B";
        assert_eq!(
            parse_pairwise_verdict(response),
            Some(PairwiseVerdict::ModelB)
        );
    }

    #[test]
    fn test_verdict_tolerates_emphasis_and_case() {
        assert_eq!(
            parse_pairwise_verdict("**Winner: tie**"),
            Some(PairwiseVerdict::Tie)
        );
        assert_eq!(
            parse_pairwise_verdict("winner: **B**"),
            Some(PairwiseVerdict::ModelB)
        );
    }

    #[test]
    fn test_verdict_model_label_spelling() {
        assert_eq!(
            parse_pairwise_verdict("WINNER: Model A"),
            Some(PairwiseVerdict::ModelA)
        );
    }

    #[test]
    fn test_verdict_missing_marker_is_none() {
        assert_eq!(parse_pairwise_verdict("Both answers look fine."), None);
        assert_eq!(parse_pairwise_verdict(""), None);
    }

    #[test]
    fn test_verdict_unrecognized_token_is_none() {
        assert_eq!(parse_pairwise_verdict("WINNER: C"), None);
    }

    // ==================== extract_fenced_block Tests ====================

    #[test]
    fn test_fenced_block_prefers_json_tag() {
        let response = "```\nplain\n```\n```json\n{\"a\": 1}\n```";
        assert_eq!(extract_fenced_block(response), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_fenced_block_unclosed_is_none() {
        assert_eq!(extract_fenced_block("```json\n{\"a\": 1}"), None);
    }

    #[test]
    fn test_lenient_parse_direct_beats_fence() {
        let value: serde_json::Value = parse_json_lenient("{\"k\": 3}").unwrap();
        assert_eq!(value["k"], 3);
    }
}
