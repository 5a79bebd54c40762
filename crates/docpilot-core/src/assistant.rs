//! Conversation orchestrator.
//!
//! One call to [`Assistant::respond`] is one run: a first model completion
//! with the documentation tool advertised, at most one tool round, and a
//! final completion with no tools. The flow is driven by the [`Turn`] state
//! enum; a failed run surfaces as `Err(AssistantError)`.
//!
//! ```text
//! AwaitingFirstCompletion ──(no tool calls)──────────────────────▶ Done
//!          │
//!          └──(tool calls)──▶ ToolRound ──▶ AwaitingFinalCompletion ──▶ Done
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use docpilot_config::AppConfig;

use crate::conversation::{AssistantReply, ConversationTurn};
use crate::docs::DocSearch;
use crate::llm::{
    self, ChatMessage, ChatRequest, ChatResponse, LlmError, LlmProvider, ToolCall, ToolDefinition,
};
use crate::telemetry::Tracer;
use crate::tools::ToolExecutor;

/// Name under which runs are exported to the trace sink.
pub const TRACE_NAME: &str = "assistant-response";

/// Errors that abort an orchestration run.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("language model not configured: {0}")]
    Configuration(String),

    #[error("model call failed: {0}")]
    ModelCall(#[from] LlmError),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Caller-supplied identifiers attached to the exported trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// Orchestration state for a single run.
#[derive(Debug)]
enum Turn {
    AwaitingFirstCompletion,
    ToolRound { content: String, calls: Vec<ToolCall> },
    AwaitingFinalCompletion { calls: Vec<ToolCall> },
    Done(AssistantReply),
}

/// Documentation assistant: answers a conversation, consulting the docs
/// through a single tool round when the model asks for it.
pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    tracer: Arc<Tracer>,
    system_prompt: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl Assistant {
    pub fn new(provider: Arc<dyn LlmProvider>, executor: ToolExecutor) -> Self {
        Self {
            provider,
            executor,
            tracer: Arc::new(Tracer::disabled()),
            system_prompt: default_system_prompt("the product"),
            model: String::new(),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    /// Wire up provider, search, executor and tracer from a loaded config.
    pub fn from_config(config: &AppConfig) -> Result<Self, AssistantError> {
        let provider = llm::create_provider(&config.llm)?;
        let search = Arc::new(DocSearch::from_config(&config.docs));
        let executor = ToolExecutor::from_config(search, &config.docs);
        let system_prompt = config
            .assistant
            .system_prompt
            .clone()
            .unwrap_or_else(|| default_system_prompt(&config.assistant.product_name));

        Ok(Self::new(provider, executor)
            .with_tracer(Arc::new(Tracer::from_config(&config.telemetry)))
            .with_system_prompt(system_prompt)
            .with_model(&config.llm.model)
            .with_max_tokens(config.llm.max_tokens)
            .with_temperature(config.llm.temperature))
    }

    pub fn with_tracer(mut self, tracer: Arc<Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer the last user turn of `history`.
    pub async fn respond(
        &self,
        history: &[ConversationTurn],
    ) -> Result<AssistantReply, AssistantError> {
        self.respond_with(history, &RequestContext::default()).await
    }

    /// Answer the last user turn of `history`, tagging the trace with `ctx`.
    pub async fn respond_with(
        &self,
        history: &[ConversationTurn],
        ctx: &RequestContext,
    ) -> Result<AssistantReply, AssistantError> {
        info!(
            provider = self.provider.name(),
            turns = history.len(),
            "assistant run started"
        );

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(history.iter().map(ConversationTurn::to_chat_message));

        let mut state = Turn::AwaitingFirstCompletion;
        let reply = loop {
            state = match state {
                Turn::AwaitingFirstCompletion => {
                    let tools = self.executor.registry().definitions();
                    let response = self.complete(&messages, tools).await?;
                    check_shape(&response)?;
                    let content = response.message.text();
                    let calls = response.message.tool_calls.unwrap_or_default();
                    if calls.is_empty() {
                        Turn::Done(AssistantReply::text(content))
                    } else {
                        Turn::ToolRound { content, calls }
                    }
                }
                Turn::ToolRound { content, calls } => {
                    info!(calls = calls.len(), "running tool round");
                    let results = self.executor.execute(&calls).await;
                    messages.push(ChatMessage::assistant_tool_calls(content, calls.clone()));
                    messages.extend(
                        results
                            .into_iter()
                            .map(|r| ChatMessage::tool_result(r.tool_call_id, r.content)),
                    );
                    Turn::AwaitingFinalCompletion { calls }
                }
                Turn::AwaitingFinalCompletion { calls } => {
                    let response = self.complete(&messages, Vec::new()).await?;
                    check_shape(&response)?;
                    Turn::Done(AssistantReply::with_tool_calls(
                        response.message.text(),
                        calls,
                    ))
                }
                Turn::Done(reply) => break reply,
            };
        };

        info!(used_tools = reply.used_tools(), "assistant run finished");
        self.trace(history, ctx, &reply).await;
        Ok(reply)
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Vec<ToolDefinition>,
    ) -> Result<ChatResponse, AssistantError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            tools,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: None,
        };
        debug!(
            messages = request.messages.len(),
            tools = request.tools.len(),
            "calling model"
        );
        let response = self.provider.chat(&request).await?;
        debug!(
            finish_reason = %response.finish_reason,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "model responded"
        );
        Ok(response)
    }

    async fn trace(
        &self,
        history: &[ConversationTurn],
        ctx: &RequestContext,
        reply: &AssistantReply,
    ) {
        let queries: Vec<&str> = reply
            .tool_calls()
            .unwrap_or_default()
            .iter()
            .filter_map(|c| c.arguments.get("query").and_then(serde_json::Value::as_str))
            .collect();
        let metadata = serde_json::json!({
            "provider": self.provider.name(),
            "model": self.model,
            "history_turns": history.len(),
            "tool_round": reply.used_tools(),
            "queries": queries,
        });
        self.tracer
            .record(
                TRACE_NAME,
                ctx.conversation_id.as_deref(),
                ctx.user_id.as_deref(),
                metadata,
            )
            .await;
    }
}

/// Reject responses the orchestrator cannot act on.
fn check_shape(response: &ChatResponse) -> Result<(), AssistantError> {
    let calls = response.tool_calls();
    if let Some(call) = calls.iter().find(|c| c.id.is_empty() || c.name.is_empty()) {
        return Err(AssistantError::MalformedResponse(format!(
            "tool call missing id or name (id={:?}, name={:?})",
            call.id, call.name
        )));
    }
    if calls.is_empty() && response.message.content.is_none() {
        return Err(AssistantError::MalformedResponse(
            "response has neither content nor tool calls".to_string(),
        ));
    }
    Ok(())
}

/// Built-in instructions establishing the assistant's identity.
pub fn default_system_prompt(product_name: &str) -> String {
    format!(
        "You are the documentation assistant for {product_name}. \
         Always assume questions are about {product_name} unless the user states otherwise. \
         Use the search_documentation tool to ground your answers in the documentation, \
         and say so when the documentation does not cover a question."
    )
}
