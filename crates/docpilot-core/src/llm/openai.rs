//! OpenAI-compatible API provider.
//!
//! Implements the [`LlmProvider`] trait for OpenAI's Chat Completions API.
//! Also compatible with any provider that follows the OpenAI API format
//! (e.g. Ollama, vLLM, Together AI).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::BoxFuture;
use crate::build_info;

use super::provider::{LlmError, LlmProvider, error_for_status};
use super::types::*;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: Client,
    api_key: Zeroizing<String>,
    base_url: String,
    default_model: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(build_info::user_agent())
                .build()
                .unwrap_or_default(),
            api_key: Zeroizing::new(api_key.into()),
            base_url: OPENAI_API_URL.to_string(),
            default_model: "gpt-4o".to_string(),
        }
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set a custom base URL (for OpenAI-compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Convert our ChatRequest into OpenAI's API format.
    fn build_request_body(&self, request: &ChatRequest) -> OpenAiRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut messages: Vec<OpenAiMessage> = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        for msg in &request.messages {
            let tool_calls = msg.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|tc| OpenAiToolCall {
                        id: tc.id.clone(),
                        r#type: "function".to_string(),
                        function: OpenAiFunction {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect()
            });
            // Assistant tool-call turns with no text are sent with null content.
            let content = msg
                .content
                .as_ref()
                .map(MessageContent::flatten_text)
                .filter(|text| !(text.is_empty() && tool_calls.is_some()));
            messages.push(OpenAiMessage {
                role: msg.role.clone(),
                content,
                tool_calls,
                tool_call_id: msg.tool_call_id.clone(),
            });
        }

        let tools: Vec<OpenAiTool> = request
            .tools
            .iter()
            .map(|t| OpenAiTool {
                r#type: "function".to_string(),
                function: OpenAiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect();

        OpenAiRequest {
            model,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        }
    }

    /// Parse OpenAI's response into our ChatResponse.
    fn parse_response(&self, resp: OpenAiResponse) -> Result<ChatResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("no choices in response".to_string()))?;

        let tool_calls = match choice.message.tool_calls {
            Some(calls) => Some(
                calls
                    .into_iter()
                    .map(|tc| {
                        let arguments = serde_json::from_str(&tc.function.arguments).map_err(|e| {
                            LlmError::Parse(format!(
                                "tool call {} has invalid JSON arguments: {e}",
                                tc.id
                            ))
                        })?;
                        Ok(ToolCall {
                            id: tc.id,
                            name: tc.function.name,
                            arguments,
                        })
                    })
                    .collect::<Result<Vec<_>, LlmError>>()?,
            ),
            None => None,
        }
        .filter(|calls| !calls.is_empty());

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => "stop".to_string(),
            Some("tool_calls") => "tool_use".to_string(),
            Some("length") => "length".to_string(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };

        Ok(ChatResponse {
            message: ChatMessage {
                role: "assistant".to_string(),
                content: choice.message.content.map(MessageContent::Text),
                tool_call_id: None,
                tool_calls,
            },
            finish_reason,
            usage: resp.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: resp.model,
        })
    }
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>> {
        let body = self.build_request_body(request);
        Box::pin(async move {
            debug!(model = %body.model, messages = body.messages.len(), "OpenAI chat request");

            let resp = self
                .client
                .post(&self.base_url)
                .bearer_auth(self.api_key.as_str())
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        LlmError::Timeout
                    } else {
                        LlmError::Network(e.to_string())
                    }
                })?;

            let status = resp.status();
            if !status.is_success() {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                let error_body = resp.text().await.unwrap_or_default();
                return Err(error_for_status(status.as_u16(), retry_after, error_body));
            }

            let api_resp: OpenAiResponse = resp
                .json()
                .await
                .map_err(|e| LlmError::Parse(e.to_string()))?;

            self.parse_response(api_resp)
        })
    }
}

// ── OpenAI API types (private) ──────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiToolFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_simple_request() {
        let provider = OpenAiProvider::new("test-key");
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage::user("Hello!")],
            system: Some("You are helpful.".to_string()),
            max_tokens: 1024,
            ..Default::default()
        };

        let body = provider.build_request_body(&request);
        assert_eq!(body.model, "gpt-4o");
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].role, "user");
        assert!(body.tools.is_none());
    }

    #[test]
    fn test_build_tool_round_messages() {
        let provider = OpenAiProvider::new("test-key");
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "search_documentation".to_string(),
            arguments: json!({"query": "traces"}),
        };
        let request = ChatRequest {
            messages: vec![
                ChatMessage::user("What are traces?"),
                ChatMessage::assistant_tool_calls("", vec![call]),
                ChatMessage::tool_result("call_1", "1. Traces\n..."),
            ],
            ..Default::default()
        };

        let body = provider.build_request_body(&request);
        let assistant = &body.messages[1];
        assert!(assistant.content.is_none());
        let calls = assistant.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.arguments, r#"{"query":"traces"}"#);
        assert_eq!(body.messages[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_parse_text_response() {
        let provider = OpenAiProvider::new("test-key");
        let api_resp = OpenAiResponse {
            model: "gpt-4o".to_string(),
            choices: vec![OpenAiChoice {
                message: OpenAiMessage {
                    role: "assistant".to_string(),
                    content: Some("Hello!".to_string()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(OpenAiUsage {
                prompt_tokens: 5,
                completion_tokens: 3,
                total_tokens: 8,
            }),
        };

        let resp = provider.parse_response(api_resp).unwrap();
        assert_eq!(resp.message.text(), "Hello!");
        assert_eq!(resp.finish_reason, "stop");
        assert_eq!(resp.usage.total_tokens, 8);
        assert!(resp.tool_calls().is_empty());
    }

    #[test]
    fn test_parse_tool_call_response() {
        let provider = OpenAiProvider::new("test-key");
        let api_resp: OpenAiResponse = serde_json::from_value(json!({
            "model": "gpt-4o",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "search_documentation",
                            "arguments": "{\"query\":\"traces\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let resp = provider.parse_response(api_resp).unwrap();
        assert_eq!(resp.finish_reason, "tool_use");
        let calls = resp.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].arguments, json!({"query": "traces"}));
    }

    #[test]
    fn test_parse_rejects_invalid_arguments() {
        let provider = OpenAiProvider::new("test-key");
        let api_resp: OpenAiResponse = serde_json::from_value(json!({
            "model": "gpt-4o",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "search_documentation", "arguments": "{not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        assert!(matches!(
            provider.parse_response(api_resp),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_no_choices() {
        let provider = OpenAiProvider::new("test-key");
        let api_resp = OpenAiResponse {
            model: "gpt-4o".to_string(),
            choices: vec![],
            usage: None,
        };
        assert!(provider.parse_response(api_resp).is_err());
    }

    #[test]
    fn test_custom_base_url() {
        let provider =
            OpenAiProvider::new("key").with_base_url("http://localhost:11434/v1/chat/completions");
        assert_eq!(
            provider.base_url,
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
