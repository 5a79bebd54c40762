//! Documentation corpus fixtures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docpilot_core::docs::{DocSearch, InMemoryCorpus};
use tempfile::TempDir;

/// A small corpus in the flat `# Title` format, with a preamble.
pub const SAMPLE_CORPUS: &str = "\
Acme Observability documentation export.

# Getting Started
Create a project in the dashboard, then install the SDK.
Your first traces appear within a minute.

# Traces
A trace records one request end to end. Traces group observations.
Use the traces view to filter by user.

# Scores
Scores attach numeric evaluations to traces.

# Billing
Invoices are issued monthly.
";

/// A search engine over [`SAMPLE_CORPUS`].
pub fn sample_search() -> Arc<DocSearch> {
    Arc::new(DocSearch::new(Arc::new(InMemoryCorpus::new(
        "sample",
        SAMPLE_CORPUS,
    ))))
}

/// A corpus file in a temp directory, deleted on drop.
pub struct TestCorpus {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestCorpus {
    /// Write `text` to `llms.txt` in a fresh temp directory.
    pub async fn with_text(text: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("llms.txt");
        tokio::fs::write(&path, text)
            .await
            .expect("failed to write test corpus");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    pub async fn sample() -> Self {
        Self::with_text(SAMPLE_CORPUS).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the corpus file (for cache invalidation tests).
    pub async fn rewrite(&self, text: &str) {
        tokio::fs::write(&self.path, text)
            .await
            .expect("failed to rewrite test corpus");
    }
}
