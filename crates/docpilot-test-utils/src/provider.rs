//! A scripted [`LlmProvider`] for orchestration tests.
//!
//! Responses are served from a queue in order; every request is recorded so
//! tests can assert on what the assistant sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use docpilot_core::BoxFuture;
use docpilot_core::llm::{
    ChatMessage, ChatRequest, ChatResponse, LlmError, LlmProvider, MessageContent, TokenUsage,
    ToolCall,
};

/// Fake provider returning queued results.
///
/// Once the queue is drained every further call fails with
/// `LlmError::Request`, which surfaces unexpected extra model calls.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn respond(self, response: ChatResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, item: Result<ChatResponse, LlmError>) {
        self.responses
            .lock()
            .expect("scripted provider lock poisoned")
            .push_back(item);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .expect("scripted provider lock poisoned")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("scripted provider lock poisoned")
            .len()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>> {
        self.requests
            .lock()
            .expect("scripted provider lock poisoned")
            .push(request.clone());
        let next = self
            .responses
            .lock()
            .expect("scripted provider lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Request("no scripted response left".to_string())));
        Box::pin(async move { next })
    }
}

/// A plain text completion.
pub fn text_response(text: &str) -> ChatResponse {
    response(Some(MessageContent::Text(text.to_string())), None, "stop")
}

/// A completion requesting tool calls, with optional content.
pub fn tool_call_response(content: Option<MessageContent>, calls: Vec<ToolCall>) -> ChatResponse {
    response(content, Some(calls), "tool_use")
}

/// A tool call with JSON arguments.
pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

fn response(
    content: Option<MessageContent>,
    tool_calls: Option<Vec<ToolCall>>,
    finish_reason: &str,
) -> ChatResponse {
    ChatResponse {
        message: ChatMessage {
            role: "assistant".to_string(),
            content,
            tool_call_id: None,
            tool_calls,
        },
        finish_reason: finish_reason.to_string(),
        usage: TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        },
        model: "test-model".to_string(),
    }
}
