//! Documentation search engine: ranks corpus sections against a query.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::BoxFuture;

use super::scoring::PreparedQuery;
use super::sections::{DocumentSection, parse_sections};

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 5;

/// Errors from documentation search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("documentation corpus {id} is unavailable: {reason}")]
    CorpusUnavailable { id: String, reason: String },
}

/// A ranked section returned by [`DocSearch::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Section title.
    pub section: String,
    /// Section body.
    pub content: String,
    /// Relevance within this query only.
    pub relevance: f64,
}

/// Where the raw documentation text comes from.
pub trait CorpusSource: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn id(&self) -> &str;

    /// Read the full corpus text.
    fn load(&self) -> BoxFuture<'_, Result<String, SearchError>>;
}

/// A corpus read from a file on every load.
pub struct FileCorpus {
    path: PathBuf,
    id: String,
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path.display().to_string();
        Self { path, id }
    }
}

impl CorpusSource for FileCorpus {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> BoxFuture<'_, Result<String, SearchError>> {
        Box::pin(async move {
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| SearchError::CorpusUnavailable {
                    id: self.id.clone(),
                    reason: e.to_string(),
                })
        })
    }
}

/// A corpus held in memory.
pub struct InMemoryCorpus {
    id: String,
    text: RwLock<String>,
}

impl InMemoryCorpus {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: RwLock::new(text.into()),
        }
    }

    /// Swap the corpus text.
    pub fn replace(&self, text: impl Into<String>) {
        if let Ok(mut guard) = self.text.write() {
            *guard = text.into();
        }
    }
}

impl CorpusSource for InMemoryCorpus {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> BoxFuture<'_, Result<String, SearchError>> {
        Box::pin(async move {
            self.text
                .read()
                .map(|text| text.clone())
                .map_err(|_| SearchError::CorpusUnavailable {
                    id: self.id.clone(),
                    reason: "corpus lock poisoned".to_string(),
                })
        })
    }
}

/// Parsed sections cached against the hash of the text they came from.
struct CachedSections {
    content_hash: u64,
    sections: Arc<Vec<DocumentSection>>,
}

/// Keyword search over a [`CorpusSource`].
pub struct DocSearch {
    source: Arc<dyn CorpusSource>,
    cache: Option<RwLock<Option<CachedSections>>>,
}

impl DocSearch {
    /// Search engine that re-parses the corpus on every call.
    pub fn new(source: Arc<dyn CorpusSource>) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Search engine that reuses parsed sections until the corpus text changes.
    pub fn with_cache(source: Arc<dyn CorpusSource>) -> Self {
        Self {
            source,
            cache: Some(RwLock::new(None)),
        }
    }

    /// Build the engine described by the `[docs]` config section.
    pub fn from_config(config: &docpilot_config::DocsConfig) -> Self {
        let source: Arc<dyn CorpusSource> = Arc::new(FileCorpus::new(&config.corpus_path));
        if config.cache {
            Self::with_cache(source)
        } else {
            Self::new(source)
        }
    }

    pub fn source_id(&self) -> &str {
        self.source.id()
    }

    /// Load and parse the corpus, consulting the cache when enabled.
    pub async fn sections(&self) -> Result<Arc<Vec<DocumentSection>>, SearchError> {
        let text = self.source.load().await?;

        let Some(cache) = &self.cache else {
            return Ok(Arc::new(parse_sections(&text)));
        };

        let content_hash = hash_text(&text);
        if let Ok(guard) = cache.read()
            && let Some(cached) = guard.as_ref()
            && cached.content_hash == content_hash
        {
            trace!(corpus = %self.source.id(), "section cache hit");
            return Ok(Arc::clone(&cached.sections));
        }

        let sections = Arc::new(parse_sections(&text));
        debug!(
            corpus = %self.source.id(),
            sections = sections.len(),
            "parsed documentation corpus"
        );
        if let Ok(mut guard) = cache.write() {
            *guard = Some(CachedSections {
                content_hash,
                sections: Arc::clone(&sections),
            });
        }
        Ok(sections)
    }

    /// Rank sections against `query`, best first, at most `limit` entries.
    ///
    /// Only sections with a positive score are returned. Equal scores keep
    /// document order.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let sections = self.sections().await?;
        let results = rank(&sections, query, limit);
        debug!(
            query,
            candidates = sections.len(),
            returned = results.len(),
            "documentation search"
        );
        Ok(results)
    }
}

/// Score, filter and order `sections` for `query`.
pub fn rank(sections: &[DocumentSection], query: &str, limit: usize) -> Vec<SearchResult> {
    let prepared = PreparedQuery::new(query);
    trace!(
        normalized = prepared.normalized(),
        terms = ?prepared.terms().collect::<Vec<_>>(),
        beginner = prepared.is_beginner(),
        "prepared query"
    );

    let mut results: Vec<SearchResult> = sections
        .iter()
        .filter_map(|s| {
            let relevance = prepared.score(&s.title, &s.body);
            (relevance > 0.0).then(|| SearchResult {
                section: s.title.clone(),
                content: s.body.clone(),
                relevance,
            })
        })
        .collect();

    // `sort_by` is stable, so ties keep document order.
    results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    results.truncate(limit);
    results
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
