//! Documentation search over file-backed corpora.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use docpilot_core::docs::{DocSearch, FileCorpus, parse_sections, score};
use docpilot_test_utils::{SAMPLE_CORPUS, TestConfigBuilder, TestCorpus};

#[tokio::test]
async fn sections_drop_only_preamble_and_markers() {
    let sections = parse_sections(SAMPLE_CORPUS);
    let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Getting Started", "Traces", "Scores", "Billing"]);

    let rejoined: String = sections
        .iter()
        .map(|s| s.body.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let expected: String = SAMPLE_CORPUS
        .lines()
        .skip_while(|l| !l.starts_with("# "))
        .filter(|l| !l.starts_with("# "))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(rejoined, expected);
}

#[tokio::test]
async fn beginner_question_ranks_getting_started_first() {
    let corpus = TestCorpus::sample().await;
    let search = DocSearch::new(Arc::new(FileCorpus::new(corpus.path())));

    let results = search.search("how do I create my first project", 5).await.unwrap();
    assert_eq!(results[0].section, "Getting Started");
}

#[tokio::test]
async fn cached_search_sees_rewritten_corpus() {
    let corpus = TestCorpus::with_text("# Alpha\nwidgets live here\n").await;
    let config = TestConfigBuilder::new().corpus_path(corpus.path()).build();
    let search = DocSearch::from_config(&config.docs);

    let before = search.search("widgets", 5).await.unwrap();
    assert_eq!(before[0].section, "Alpha");

    corpus.rewrite("# Beta\nwidgets moved here\n").await;
    let after = search.search("widgets", 5).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].section, "Beta");
}

#[tokio::test]
async fn results_are_bounded_and_sorted() {
    let corpus = TestCorpus::sample().await;
    let search = DocSearch::new(Arc::new(FileCorpus::new(corpus.path())));

    for (query, limit) in [("traces", 1), ("traces scores", 2), ("the and of", 5)] {
        let results = search.search(query, limit).await.unwrap();
        assert!(results.len() <= limit, "{query}: {} > {limit}", results.len());
        for pair in results.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
    }
}

#[test]
fn exact_title_outranks_body_mentions() {
    let title_hit = score("scores", "Scores", "Numeric evaluations.");
    let body_hit = score("scores", "Traces", "Traces can have scores attached, many scores.");
    assert!(title_hit > body_hit);
}
