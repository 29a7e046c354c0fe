//! Application-level configuration.
//!
//! Names which model identities fill the engine-side roles. Participant
//! models are always addressed by the ids on their responses; these roles
//! cover the calls the engine itself originates.

/// Model roles used by the strategies.
///
/// `judge` answers comparison and scoring calls, `summarizer` writes the
/// final consensus text. The council strategy draws its judges from the
/// participants themselves and only uses the summarizer role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyModels {
    pub judge: String,
    pub summarizer: String,
}

impl StrategyModels {
    pub fn new(judge: impl Into<String>, summarizer: impl Into<String>) -> Self {
        Self {
            judge: judge.into(),
            summarizer: summarizer.into(),
        }
    }

    /// Uses one model for both roles.
    pub fn single(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            judge: model.clone(),
            summarizer: model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_fills_both_roles() {
        let models = StrategyModels::single("arbiter-1");
        assert_eq!(models.judge, "arbiter-1");
        assert_eq!(models.summarizer, "arbiter-1");
    }

    #[test]
    fn test_new_keeps_roles_distinct() {
        let models = StrategyModels::new("judge-model", "writer-model");
        assert_eq!(models.judge, "judge-model");
        assert_eq!(models.summarizer, "writer-model");
    }
}
