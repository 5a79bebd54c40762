//! Documentation retrieval: corpus indexing, relevance scoring, and search.
//!
//! ```text
//! ┌──────────────┐   text   ┌──────────────┐ sections ┌─────────────┐
//! │ CorpusSource │────────▶│   sections   │────────▶│   scoring   │
//! │ (file / mem) │          │ (# splitter) │          │ (keywords)  │
//! └──────────────┘          └──────────────┘          └──────┬──────┘
//!                                                           │
//!                                                   ranked SearchResult
//! ```

pub mod scoring;
pub mod search;
pub mod sections;

pub use scoring::{PreparedQuery, score};
pub use search::{
    CorpusSource, DEFAULT_LIMIT, DocSearch, FileCorpus, InMemoryCorpus, SearchError, SearchResult,
};
pub use sections::{DocumentSection, parse_sections};
