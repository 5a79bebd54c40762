//! LLM provider integration: chat completions with tool use.
//!
//! Docpilot talks to language models through a unified [`LlmProvider`] trait.
//! Currently supported:
//!
//! - **Anthropic**: Claude models via the Messages API
//! - **OpenAI**: GPT models via the Chat Completions API (also compatible with
//!   Ollama, vLLM, Together AI, and other OpenAI-compatible endpoints)
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐     ┌──────────────┐
//! │ Assistant │────▶│ LlmProvider  │  (trait)
//! └───────────┘     └──────┬───────┘
//!                          │
//!              ┌───────────┴───────────┐
//!              ▼                       ▼
//!     ┌──────────────┐         ┌──────────────┐
//!     │  Anthropic   │         │    OpenAI    │
//!     │ (Claude API) │         │  (GPT API)   │
//!     └──────────────┘         └──────────────┘
//! ```

pub mod anthropic;
pub mod openai;
pub mod provider;
pub mod types;

use std::sync::Arc;

use tracing::info;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider::{LlmError, LlmProvider};
pub use types::*;

use crate::assistant::AssistantError;

/// Create an LLM provider from config.
///
/// Fails with [`AssistantError::Configuration`] when no API key can be
/// resolved or no model is named.
pub fn create_provider(
    config: &docpilot_config::LlmConfig,
) -> Result<Arc<dyn LlmProvider>, AssistantError> {
    use docpilot_config::LlmProviderKind;

    if config.model.trim().is_empty() {
        return Err(AssistantError::Configuration(
            "llm.model is not set".to_string(),
        ));
    }
    let api_key = config.resolved_api_key().ok_or_else(|| {
        AssistantError::Configuration(format!(
            "no API key: set llm.api_key or the {} environment variable",
            config.api_key_env
        ))
    })?;

    let provider: Arc<dyn LlmProvider> = match config.provider {
        LlmProviderKind::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key).with_model(&config.model);
            if let Some(ref base_url) = config.base_url {
                provider = provider.with_base_url(base_url);
            }
            Arc::new(provider)
        }
        LlmProviderKind::OpenAi => {
            let mut provider = OpenAiProvider::new(api_key).with_model(&config.model);
            if let Some(ref base_url) = config.base_url {
                provider = provider.with_base_url(base_url);
            }
            Arc::new(provider)
        }
    };
    info!(provider = provider.name(), model = %config.model, "LLM provider configured");
    Ok(provider)
}
