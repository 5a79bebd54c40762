//! LLM provider trait: the core abstraction for chat completions.
//!
//! All LLM backends (Anthropic, OpenAI-compatible, test doubles) implement
//! this trait. The assistant dispatches through this interface.

use crate::BoxFuture;

use super::types::{ChatRequest, ChatResponse};

/// Errors from LLM provider calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    Request(String),

    #[error("authentication failed (check API key): {0}")]
    Auth(String),

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("context length exceeded: {0}")]
    ContextLength(String),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider error: HTTP {status}: {message}")]
    ProviderError { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout")]
    Timeout,
}

/// Core trait for LLM providers.
///
/// Uses `BoxFuture` for object safety (allows `Arc<dyn LlmProvider>`).
pub trait LlmProvider: Send + Sync {
    /// Provider display name (e.g. "Anthropic", "OpenAI").
    fn name(&self) -> &str;

    /// Perform a non-streaming chat completion.
    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>>;
}

/// Map a non-success HTTP status and body to an [`LlmError`].
pub(crate) fn error_for_status(status: u16, retry_after: Option<u64>, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Auth(body),
        404 => LlmError::ModelNotFound(body),
        408 | 504 => LlmError::Timeout,
        413 => LlmError::ContextLength(body),
        429 => LlmError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        },
        400 => LlmError::Request(body),
        _ => LlmError::ProviderError {
            status,
            message: body,
        },
    }
}
