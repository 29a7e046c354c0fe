//! Helpers shared by the strategy implementations.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ensemble_domain::ConsensusError;

use crate::ports::ai_provider::{AiProvider, ProviderError};

/// How a single provider call can fail from a strategy's point of view.
///
/// Cancellation aborts the whole invocation; every other failure is local to
/// the call and the strategy degrades around it.
#[derive(Debug)]
pub(crate) enum CallError {
    Cancelled,
    Provider(ProviderError),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "call cancelled"),
            Self::Provider(e) => write!(f, "{}", e),
        }
    }
}

/// Checks if cancellation has been requested and returns an error if so.
pub(crate) fn check_cancelled(
    cancellation_token: &Option<CancellationToken>,
) -> Result<(), ConsensusError> {
    if let Some(token) = cancellation_token
        && token.is_cancelled()
    {
        return Err(ConsensusError::Cancelled);
    }
    Ok(())
}

/// Runs one completion call to the provider and drains the stream to text.
///
/// An elapsed `call_timeout` surfaces as [`ProviderError::Timeout`] so call
/// sites treat it like any other failed call. A fired cancellation token
/// interrupts the call immediately. Tasks already running inside a
/// [`tokio::task::JoinSet`] pass `&None` here and let the collection loop
/// watch the token instead.
pub(crate) async fn complete_text(
    provider: &dyn AiProvider,
    model_id: &str,
    prompt: &str,
    call_timeout: Option<Duration>,
    cancellation_token: &Option<CancellationToken>,
) -> Result<String, CallError> {
    let call = async {
        let handle = provider.complete(model_id, prompt).await?;
        handle.collect_text().await
    };

    let call = async {
        match call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout),
            },
            None => call.await,
        }
    };

    match cancellation_token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(CallError::Cancelled),
                result = call => result.map_err(CallError::Provider),
            }
        }
        None => call.await.map_err(CallError::Provider),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::ports::ai_provider::{CompletionEvent, CompletionHandle};
    use crate::strategies::test_support::ScriptedProvider;

    use super::*;

    /// Provider whose streams never produce an event.
    struct StalledProvider {
        held_senders: Mutex<Vec<mpsc::Sender<CompletionEvent>>>,
    }

    impl StalledProvider {
        fn new() -> Self {
            Self {
                held_senders: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiProvider for StalledProvider {
        async fn complete(
            &self,
            _model_id: &str,
            _prompt: &str,
        ) -> Result<CompletionHandle, ProviderError> {
            let (tx, rx) = mpsc::channel(4);
            self.held_senders.lock().unwrap().push(tx);
            Ok(CompletionHandle::new(rx))
        }
    }

    #[test]
    fn test_check_cancelled_passes_without_token() {
        assert!(check_cancelled(&None).is_ok());
    }

    #[test]
    fn test_check_cancelled_detects_fired_token() {
        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());

        token.cancel();
        let result = check_cancelled(&Some(token));
        assert!(matches!(result, Err(ConsensusError::Cancelled)));
    }

    #[tokio::test]
    async fn test_complete_text_returns_drained_stream() {
        let provider = ScriptedProvider::new(|_, _| Ok("full text".to_string()));
        let result = complete_text(&provider, "m1", "prompt", None, &None).await;
        assert_eq!(result.unwrap(), "full text");
    }

    #[tokio::test]
    async fn test_complete_text_times_out_as_provider_error() {
        let provider = StalledProvider::new();
        let result = complete_text(
            &provider,
            "m1",
            "prompt",
            Some(Duration::from_millis(25)),
            &None,
        )
        .await;
        assert!(matches!(
            result,
            Err(CallError::Provider(ProviderError::Timeout))
        ));
    }

    #[tokio::test]
    async fn test_complete_text_honors_fired_token() {
        let provider = StalledProvider::new();
        let token = CancellationToken::new();
        token.cancel();

        let result = complete_text(&provider, "m1", "prompt", None, &Some(token)).await;
        assert!(matches!(result, Err(CallError::Cancelled)));
    }
}
