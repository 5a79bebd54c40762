//! Conversation types exchanged with the caller.
//!
//! History is owned by the caller (who persists it); the assistant only
//! reads it and hands back an [`AssistantReply`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::llm::types::{ChatMessage, ToolCall};

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    /// The chat message sent to the model for this turn, content unmodified.
    pub fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            TurnRole::User => ChatMessage::user(self.content.clone()),
            TurnRole::Assistant => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// The assistant's answer to one user turn.
///
/// `tool_calls` is present (and non-empty) exactly when a tool round ran.
/// Serialization omits the field entirely otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    content: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_calls"
    )]
    tool_calls: Option<Vec<ToolCall>>,
}

impl AssistantReply {
    /// A reply produced without consulting any tool.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: None,
        }
    }

    /// A reply produced after a tool round. An empty call list means no
    /// round ran and is recorded as such.
    pub fn with_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls: (!calls.is_empty()).then_some(calls),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The tool calls issued during this turn, if a tool round ran.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.tool_calls.as_deref()
    }

    pub fn used_tools(&self) -> bool {
        self.tool_calls.is_some()
    }
}

fn non_empty_calls<'de, D>(deserializer: D) -> Result<Option<Vec<ToolCall>>, D::Error>
where
    D: Deserializer<'de>,
{
    let calls = Option::<Vec<ToolCall>>::deserialize(deserializer)?;
    Ok(calls.filter(|c| !c.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_turn_maps_role_and_content() {
        let msg = ConversationTurn::assistant("Earlier answer").to_chat_message();
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.text(), "Earlier answer");
    }

    #[test]
    fn test_turn_deserializes_lowercase_roles() {
        let turns: Vec<ConversationTurn> = serde_json::from_value(json!([
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"}
        ]))
        .unwrap();
        assert_eq!(turns[0], ConversationTurn::user("hi"));
        assert_eq!(turns[1].role, TurnRole::Assistant);
    }

    #[test]
    fn test_text_reply_omits_tool_calls_field() {
        let value = serde_json::to_value(AssistantReply::text("hi")).unwrap();
        assert_eq!(value, json!({"content": "hi"}));
    }

    #[test]
    fn test_empty_call_list_means_no_tool_round() {
        let reply = AssistantReply::with_tool_calls("hi", Vec::new());
        assert!(!reply.used_tools());
        assert_eq!(reply.tool_calls(), None);
    }

    #[test]
    fn test_reply_round_trip_with_calls() {
        let call = ToolCall {
            id: "t1".to_string(),
            name: "search_documentation".to_string(),
            arguments: json!({"query": "traces"}),
        };
        let reply = AssistantReply::with_tool_calls("answer", vec![call.clone()]);
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["tool_calls"][0]["id"], "t1");

        let back: AssistantReply = serde_json::from_value(value).unwrap();
        assert_eq!(back.tool_calls(), Some(&[call][..]));
    }

    #[test]
    fn test_deserialize_empty_calls_as_absent() {
        let reply: AssistantReply =
            serde_json::from_value(json!({"content": "x", "tool_calls": []})).unwrap();
        assert!(!reply.used_tools());
    }
}
