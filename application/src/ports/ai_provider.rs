//! AI provider port
//!
//! Defines the interface for completing prompts against named models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Timing and token metadata reported with a finished completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub duration_ms: u64,
}

/// One event in a completion stream.
#[derive(Debug, Clone)]
pub enum CompletionEvent {
    /// Incremental text chunk
    Chunk(String),
    /// Final full text plus optional usage metadata
    Completed {
        text: String,
        usage: Option<TokenUsage>,
    },
    /// The completion failed after starting
    Error(String),
}

/// Handle for receiving completion events from a provider.
///
/// Wraps an `mpsc::Receiver<CompletionEvent>` so callers that want streaming
/// UX can consume chunks, while the consensus engine drains everything with
/// [`CompletionHandle::collect_text`].
pub struct CompletionHandle {
    pub receiver: mpsc::Receiver<CompletionEvent>,
}

impl CompletionHandle {
    pub fn new(receiver: mpsc::Receiver<CompletionEvent>) -> Self {
        Self { receiver }
    }

    /// Build an already-completed handle from a final text. Useful for
    /// providers that have no incremental mode.
    pub fn from_text(text: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(CompletionEvent::Completed {
            text: text.into(),
            usage: None,
        });
        Self::new(rx)
    }

    /// Consume the stream and resolve to the final text, discarding chunk
    /// granularity and usage metadata.
    pub async fn collect_text(mut self) -> Result<String, ProviderError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                CompletionEvent::Chunk(chunk) => full_text.push_str(&chunk),
                CompletionEvent::Completed { text, .. } => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                CompletionEvent::Error(e) => {
                    return Err(ProviderError::RequestFailed(e));
                }
            }
        }
        // Channel closed without a Completed event: return what accumulated
        Ok(full_text)
    }
}

/// Provider for prompt completion
///
/// This port is the engine's only route to a language model: complete one
/// prompt against the model named by `model_id`. Implementations (vendor
/// clients, routers, fakes) live outside this workspace.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn complete(&self, model_id: &str, prompt: &str)
    -> Result<CompletionHandle, ProviderError>;
}
