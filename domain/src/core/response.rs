//! Ensemble member responses

use serde::{Deserialize, Serialize};

/// One ensemble member's answer to the shared prompt.
///
/// Created by the caller, never mutated by the engine. `model_id` is the
/// stable identity every ranking keys on; `model_name` is display-only and
/// must never leak into anonymized judge prompts.
///
/// # Example
///
/// ```
/// use ensemble_domain::core::response::ModelResponse;
///
/// let response = ModelResponse::new("gpt-5.2", "GPT 5.2", "The answer is 18.");
/// assert_eq!(response.model_id, "gpt-5.2");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub model_id: String,
    pub model_name: String,
    pub content: String,
}

impl ModelResponse {
    pub fn new(
        model_id: impl Into<String>,
        model_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: model_name.into(),
            content: content.into(),
        }
    }
}
