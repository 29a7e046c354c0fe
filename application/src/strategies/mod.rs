//! Consensus strategy implementations.
//!
//! Three strategies with different cost and robustness trade-offs:
//!
//! - [`MajorityVoteStrategy`]: one alignment-scoring judge call
//! - [`EloRankingStrategy`]: debiased all-pairs judge tournament
//! - [`CouncilStrategy`]: five-phase adversarial debate
//!
//! All of them implement [`ensemble_domain::ConsensusStrategy`] and degrade
//! around individual call failures instead of failing the invocation.

mod shared;

pub mod council;
pub mod elo;
pub mod majority;

pub use council::{CouncilConfig, CouncilStrategy};
pub use elo::{EloRankingConfig, EloRankingStrategy};
pub use majority::{MajorityVoteConfig, MajorityVoteStrategy};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::ports::ai_provider::{AiProvider, CompletionHandle, ProviderError};

    /// One recorded provider call.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub model_id: String,
        pub prompt: String,
    }

    type Script = dyn Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync;

    /// In-memory provider for strategy tests: answers according to a script
    /// closure and records every call for assertions.
    pub(crate) struct ScriptedProvider {
        script: Box<Script>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(
            script: impl Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn prompts_containing(&self, marker: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.prompt.contains(marker))
                .map(|call| call.prompt.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn complete(
            &self,
            model_id: &str,
            prompt: &str,
        ) -> Result<CompletionHandle, ProviderError> {
            self.calls.lock().unwrap().push(RecordedCall {
                model_id: model_id.to_string(),
                prompt: prompt.to_string(),
            });
            let text = (self.script)(model_id, prompt)?;
            Ok(CompletionHandle::from_text(text))
        }
    }
}
