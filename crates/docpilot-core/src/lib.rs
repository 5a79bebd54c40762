#![deny(unsafe_code)]

//! Docpilot core: a documentation assistant.
//!
//! Splits a product's documentation corpus into sections, ranks them against
//! keyword queries, and answers conversations through a language model that
//! may consult the documentation via a single `search_documentation` tool
//! round per user turn.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future. The return type for async trait
/// methods that need dynamic dispatch (`dyn Trait`).
///
/// Native `async fn` in traits produces opaque return types that are not
/// object-safe, so traits consumed via `Arc<dyn Trait>` return a concrete
/// `Pin<Box<dyn Future>>` instead.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Conversation orchestrator and its error type.
pub mod assistant;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Conversation turns and assistant replies.
pub mod conversation;
/// Corpus indexing, relevance scoring, and documentation search.
pub mod docs;
/// LLM provider abstraction and Anthropic / OpenAI clients.
pub mod llm;
/// Optional trace export.
pub mod telemetry;
/// Tool registry and executor.
pub mod tools;

pub use assistant::{Assistant, AssistantError, RequestContext};
pub use conversation::{AssistantReply, ConversationTurn, TurnRole};
pub use docs::{DocSearch, DocumentSection, SearchError, SearchResult};
pub use llm::{LlmError, LlmProvider};
pub use telemetry::{TraceSink, Tracer};
pub use tools::{ToolExecutor, ToolRegistry};
