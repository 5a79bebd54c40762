//! Common types for LLM provider integration.
//!
//! These types define the shared vocabulary for chat completions and
//! tool definitions across all LLM providers.

use serde::{Deserialize, Serialize};

/// Message content: either a plain string or a list of typed segments.
///
/// Providers that answer with content blocks (text interleaved with
/// tool-use blocks) produce [`MessageContent::Segments`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Segments(Vec<ContentSegment>),
}

/// A typed piece of segmented message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

impl MessageContent {
    /// Flatten to plain text.
    ///
    /// Segmented content keeps only the text segments, joined with `\n`.
    /// Tool-use segments are dropped; they travel as structured tool calls.
    pub fn flatten_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Segments(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    ContentSegment::Text { text } => Some(text.as_str()),
                    ContentSegment::ToolUse { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

/// A chat message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", "assistant", or "tool".
    pub role: String,
    /// Message content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Correlating tool call id (when role = "tool").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content.into())
    }

    /// An assistant message replaying the model's own tool-call request.
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(MessageContent::Text(content.into())),
            tool_call_id: None,
            tool_calls: Some(calls),
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(MessageContent::Text(content.into())),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: None,
        }
    }

    /// Flattened text content, empty when the message carries none.
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(MessageContent::flatten_text)
            .unwrap_or_default()
    }

    fn with_role(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(MessageContent::Text(content)),
            tool_call_id: None,
            tool_calls: None,
        }
    }
}

/// A tool that the model can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (e.g. "search_documentation").
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id chosen by the model; echoed back with the result.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments for the tool.
    pub arguments: serde_json::Value,
}

/// The outcome of executing one [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: String,
}

/// Request for a chat completion.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g. "claude-sonnet-4-20250514", "gpt-4o").
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Available tools the model may call.
    pub tools: Vec<ToolDefinition>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0–2.0).
    pub temperature: f32,
    /// Optional system prompt (overrides system message in messages).
    pub system: Option<String>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            tools: Vec::new(),
            max_tokens: 1024,
            temperature: 0.0,
            system: None,
        }
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant's response message.
    pub message: ChatMessage,
    /// Finish reason: "stop", "tool_use", "length", etc.
    pub finish_reason: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Raw model identifier used.
    pub model: String,
}

impl ChatResponse {
    /// Tool calls carried by the response, empty when there are none.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message.tool_calls.as_deref().unwrap_or_default()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_plain_text() {
        let content = MessageContent::from("hello");
        assert_eq!(content.flatten_text(), "hello");
    }

    #[test]
    fn test_flatten_drops_tool_use_segments() {
        let content = MessageContent::Segments(vec![
            ContentSegment::Text {
                text: "Let me look that up.".to_string(),
            },
            ContentSegment::ToolUse {
                id: "t1".to_string(),
                name: "search_documentation".to_string(),
                input: json!({"query": "traces"}),
            },
            ContentSegment::Text {
                text: "One moment.".to_string(),
            },
        ]);
        assert_eq!(content.flatten_text(), "Let me look that up.\nOne moment.");
    }

    #[test]
    fn test_flatten_only_tool_use_is_empty() {
        let content = MessageContent::Segments(vec![ContentSegment::ToolUse {
            id: "t1".to_string(),
            name: "search_documentation".to_string(),
            input: json!({}),
        }]);
        assert_eq!(content.flatten_text(), "");
    }

    #[test]
    fn test_segments_deserialize_from_typed_blocks() {
        let raw = json!([
            {"type": "text", "text": "hi"},
            {"type": "tool_use", "id": "t1", "name": "x", "input": {}}
        ]);
        let content: MessageContent = serde_json::from_value(raw).unwrap();
        assert!(matches!(content, MessageContent::Segments(ref s) if s.len() == 2));
    }

    #[test]
    fn test_tool_result_message() {
        let msg = ChatMessage::tool_result("call_1", "found it");
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.text(), "found it");
    }

    #[test]
    fn test_tool_calls_accessor_empty() {
        let resp = ChatResponse {
            message: ChatMessage::assistant("hi"),
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
            model: "m".to_string(),
        };
        assert!(resp.tool_calls().is_empty());
    }
}
