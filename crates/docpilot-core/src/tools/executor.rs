//! Tool executor: runs a batch of model-issued tool calls.
//!
//! Every call yields exactly one [`ToolResult`], in input order. Failures
//! never propagate: they become error text the model can read.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::docs::{DEFAULT_LIMIT, DocSearch, SearchError, SearchResult};
use crate::llm::types::{ToolCall, ToolResult};

use super::registry::{SEARCH_DOCUMENTATION, ToolRegistry};

/// Default number of content characters shown per search result.
pub const DEFAULT_SNIPPET_CHARS: usize = 500;

/// Errors raised while executing a single tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Executes tool calls against the documentation search engine.
pub struct ToolExecutor {
    registry: ToolRegistry,
    search: Arc<DocSearch>,
    search_limit: usize,
    snippet_chars: usize,
}

impl ToolExecutor {
    pub fn new(search: Arc<DocSearch>) -> Self {
        Self {
            registry: ToolRegistry::with_defaults(),
            search,
            search_limit: DEFAULT_LIMIT,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }

    /// Build an executor with limits from the `[docs]` config section.
    pub fn from_config(search: Arc<DocSearch>, config: &docpilot_config::DocsConfig) -> Self {
        Self::new(search)
            .with_search_limit(config.search_limit)
            .with_snippet_chars(config.snippet_chars)
    }

    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn with_snippet_chars(mut self, chars: usize) -> Self {
        self.snippet_chars = chars;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute all calls concurrently; results keep input order.
    pub async fn execute(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.execute_one(call))).await
    }

    async fn execute_one(&self, call: &ToolCall) -> ToolResult {
        let content = if self.registry.get(&call.name).is_none() {
            warn!(tool = %call.name, id = %call.id, "model requested unknown tool");
            format!("Unknown tool: {}", call.name)
        } else {
            match self.dispatch(call).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(tool = %call.name, id = %call.id, error = %e, "tool call failed");
                    format!("Error executing {}: {e}", call.name)
                }
            }
        };
        ToolResult {
            tool_call_id: call.id.clone(),
            content,
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<String, ToolError> {
        match call.name.as_str() {
            SEARCH_DOCUMENTATION => {
                let query = call
                    .arguments
                    .get("query")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default();
                info!(id = %call.id, query, "searching documentation");
                let results = self.search.search(query, self.search_limit).await?;
                Ok(format_results(query, &results, self.snippet_chars))
            }
            other => Ok(format!("Unknown tool: {other}")),
        }
    }
}

/// Render search results as numbered entries for the model.
pub fn format_results(query: &str, results: &[SearchResult], snippet_chars: usize) -> String {
    if results.is_empty() {
        return format!("No documentation found for query: {query}");
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\n{}",
                i + 1,
                r.section,
                truncate_chars(&r.content, snippet_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{FileCorpus, InMemoryCorpus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn executor(corpus: &str) -> ToolExecutor {
        let search = DocSearch::new(Arc::new(InMemoryCorpus::new("test", corpus)));
        ToolExecutor::new(Arc::new(search))
    }

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[tokio::test]
    async fn test_execute_empty_batch() {
        assert!(executor("").execute(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let results = executor("").execute(&[call("t1", "unknown_tool", json!({}))]).await;
        assert_eq!(
            results,
            vec![ToolResult {
                tool_call_id: "t1".to_string(),
                content: "Unknown tool: unknown_tool".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_search_formats_numbered_entries() {
        let results = executor("# Traces\nA trace records a request.\n# Billing\nMoney.")
            .execute(&[call("c1", SEARCH_DOCUMENTATION, json!({"query": "traces"}))])
            .await;
        assert_eq!(results[0].tool_call_id, "c1");
        assert!(results[0].content.starts_with("1. Traces\nA trace records a request."));
        assert!(!results[0].content.contains("Billing"));
    }

    #[tokio::test]
    async fn test_no_results_message() {
        let results = executor("# Billing\nMoney.")
            .execute(&[call("c1", SEARCH_DOCUMENTATION, json!({"query": "kubernetes"}))])
            .await;
        assert_eq!(
            results[0].content,
            "No documentation found for query: kubernetes"
        );
    }

    #[tokio::test]
    async fn test_missing_query_treated_as_empty() {
        let results = executor("# Billing\nMoney.")
            .execute(&[
                call("c1", SEARCH_DOCUMENTATION, json!({})),
                call("c2", SEARCH_DOCUMENTATION, json!({"query": 42})),
            ])
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "No documentation found for query: ");
        assert_eq!(results[1].tool_call_id, "c2");
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_call() {
        let search = DocSearch::new(Arc::new(FileCorpus::new("/nonexistent/llms.txt")));
        let exec = ToolExecutor::new(Arc::new(search));
        let results = exec
            .execute(&[
                call("a", SEARCH_DOCUMENTATION, json!({"query": "x"})),
                call("b", "unknown_tool", json!({})),
            ])
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool_call_id, "a");
        assert!(results[0].content.starts_with("Error executing search_documentation:"));
        assert_eq!(results[1].tool_call_id, "b");
        assert!(results[1].content.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_disabled_tool_is_unknown() {
        let mut registry = ToolRegistry::with_defaults();
        registry.set_enabled(SEARCH_DOCUMENTATION, false);
        let exec = executor("# A\nb").with_registry(registry);
        let results = exec
            .execute(&[call("x", SEARCH_DOCUMENTATION, json!({"query": "a"}))])
            .await;
        assert_eq!(results[0].content, "Unknown tool: search_documentation");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }

    #[test]
    fn test_format_results_truncates_content() {
        let results = vec![SearchResult {
            section: "Long".to_string(),
            content: "x".repeat(600),
            relevance: 1.0,
        }];
        let text = format_results("q", &results, 500);
        assert_eq!(text, format!("1. Long\n{}...", "x".repeat(500)));
    }
}
