//! Keyword relevance scoring of a query against one section.
//!
//! The score combines per-term occurrence counts (title hits weigh 15×),
//! flat bonuses for the whole query appearing in the body (+50) or title
//! (+100), and a 1.5× boost when a beginner-style question meets a
//! getting-started section. Terms are matched as literal substrings without
//! word boundaries, so `test` also counts inside `testing`.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

const TITLE_WEIGHT: f64 = 15.0;
const BODY_PHRASE_BONUS: f64 = 50.0;
const TITLE_PHRASE_BONUS: f64 = 100.0;
const ONBOARDING_BOOST: f64 = 1.5;

/// Terms this short carry no signal.
const MIN_TERM_LEN: usize = 3;

/// Regional spellings rewritten to the canonical form before matching.
const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("organisation", "organization"),
    ("organise", "organize"),
    ("customise", "customize"),
    ("analyse", "analyze"),
    ("colour", "color"),
    ("behaviour", "behavior"),
    ("licence", "license"),
    ("catalogue", "catalog"),
    ("centre", "center"),
    ("favourite", "favorite"),
];

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "has", "her",
    "was", "one", "our", "out", "his", "how", "its", "who", "why", "what", "when", "where",
    "which", "does", "did", "with", "this", "that", "these", "those", "have", "from", "they",
    "them", "then", "than", "will", "would", "there", "their", "about", "into", "your", "yours",
    "use", "using", "get", "want", "need", "should", "could", "please", "tell", "explain",
    "some", "also", "just", "more", "only", "very", "been", "being", "were", "is", "it", "do",
];

static BEGINNER_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(create|creating|new|start|starting|begin|beginning|setup|set up|",
        r"install|installing|onboard|onboarding|first|getting started|how do i)\b",
    ))
    .expect("beginner pattern is valid")
});

static GETTING_STARTED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(concat!(
        r"getting started|get started|quick ?start|introduction|setup|set up|",
        r"installation|onboarding|overview|first steps",
    ))
    .case_insensitive(true)
    .build()
    .expect("getting-started pattern is valid")
});

/// Lowercase `query` and rewrite spelling variants to canonical form.
pub fn normalize_query(query: &str) -> String {
    SPELLING_VARIANTS
        .iter()
        .fold(query.to_lowercase(), |acc, (variant, canonical)| {
            acc.replace(variant, canonical)
        })
}

/// Extract scoring terms from a normalized query.
///
/// Falls back to the whole original `query` when filtering leaves nothing,
/// so at least one term is always scored.
pub fn extract_terms(normalized: &str, query: &str) -> Vec<String> {
    let terms: Vec<String> = normalized
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TERM_LEN && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect();
    if terms.is_empty() {
        vec![query.to_string()]
    } else {
        terms
    }
}

/// A query prepared once and scored against many sections.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    normalized: String,
    terms: Vec<Term>,
    beginner: bool,
}

#[derive(Debug, Clone)]
struct Term {
    text: String,
    pattern: Option<Regex>,
}

impl Term {
    fn new(text: String) -> Self {
        let pattern = if text.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(&text))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self { text, pattern }
    }

    fn count_in(&self, haystack: &str) -> usize {
        self.pattern
            .as_ref()
            .map_or(0, |p| p.find_iter(haystack).count())
    }
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let normalized = normalize_query(query);
        let terms = extract_terms(&normalized, query)
            .into_iter()
            .map(Term::new)
            .collect();
        let beginner = BEGINNER_QUERY.is_match(&normalized);
        Self {
            normalized,
            terms,
            beginner,
        }
    }

    /// The case-folded, spelling-normalized query.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Terms that contribute to the frequency score.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.text.as_str())
    }

    /// Whether the query reads like an onboarding/setup question.
    pub fn is_beginner(&self) -> bool {
        self.beginner
    }

    /// Relevance of one section. Always `>= 0`.
    pub fn score(&self, title: &str, body: &str) -> f64 {
        let mut score = 0.0;

        for term in &self.terms {
            let title_hits = term.count_in(title) as f64;
            let body_hits = term.count_in(body) as f64;
            score += title_hits * TITLE_WEIGHT + body_hits;
        }

        if !self.normalized.is_empty() {
            if body.to_lowercase().contains(&self.normalized) {
                score += BODY_PHRASE_BONUS;
            }
            if title.to_lowercase().contains(&self.normalized) {
                score += TITLE_PHRASE_BONUS;
            }
        }

        if self.beginner && GETTING_STARTED_TITLE.is_match(title) {
            score *= ONBOARDING_BOOST;
        }

        score
    }
}

/// Score `query` against one section.
pub fn score(query: &str, title: &str, body: &str) -> f64 {
    PreparedQuery::new(query).score(title, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_spelling_variants() {
        assert_eq!(
            normalize_query("Customise my ORGANISATION colours"),
            "customize my organization colors"
        );
    }

    #[test]
    fn test_extract_terms_drops_short_and_stop_words() {
        let normalized = normalize_query("how do I start a project");
        let terms = extract_terms(&normalized, "how do I start a project");
        assert_eq!(terms, vec!["start", "project"]);
    }

    #[test]
    fn test_extract_terms_falls_back_to_whole_query() {
        let terms = extract_terms(&normalize_query("the a is"), "the a is");
        assert_eq!(terms, vec!["the a is"]);
    }

    #[test]
    fn test_title_hits_weigh_fifteen() {
        // "traces" appears once in the title, twice in the body.
        assert_eq!(
            score("traces", "Traces", "traces and more traces"),
            1.0 * 15.0 + 2.0 + 50.0 + 100.0
        );
    }

    #[test]
    fn test_substring_matching_without_word_boundaries() {
        assert_eq!(score("test", "Other", "testing tests"), 2.0 + 50.0);
    }

    #[test]
    fn test_no_match_scores_zero() {
        assert_eq!(score("kubernetes", "Billing", "Invoices are monthly."), 0.0);
    }

    #[test]
    fn test_body_phrase_bonus() {
        let with_phrase = score("create project", "Other", "You can create project here");
        let without_phrase = score("create project", "Other", "project you can create here");
        assert_eq!(with_phrase - without_phrase, 50.0);
    }

    #[test]
    fn test_onboarding_boost_applied_last() {
        let prepared = PreparedQuery::new("how do I start a project");
        assert!(prepared.is_beginner());
        let body = "Navigate to Settings to create a project";
        // title "start" (15) + body "project" (1) = 16, boosted 1.5x
        assert_eq!(prepared.score("Getting Started", body), 24.0);
        // Same counts without an onboarding title: no boost.
        assert_eq!(prepared.score("Restarting", body), 16.0);
    }

    #[test]
    fn test_how_do_i_question_is_beginner() {
        let prepared = PreparedQuery::new("How do I configure tracing");
        assert!(prepared.is_beginner());
        // body "configure" (1) + "tracing" (1) = 2, boosted 1.5x
        assert_eq!(
            prepared.score("Getting Started", "configure tracing here"),
            3.0
        );
        assert_eq!(prepared.score("Tracing", "configure tracing here"), 17.0);
    }

    #[test]
    fn test_spelling_variant_matches_body_terms_and_phrase() {
        let prepared = PreparedQuery::new("colour settings");
        assert_eq!(prepared.normalized(), "color settings");
        assert_eq!(prepared.terms().collect::<Vec<_>>(), vec!["color", "settings"]);
        // "color" (1) + "settings" (1) + body phrase (50)
        assert_eq!(prepared.score("Appearance", "Change color settings here."), 52.0);
    }

    #[test]
    fn test_spelling_variant_matches_title_phrase() {
        // Title hits 15 + 15, title phrase 100.
        assert_eq!(
            score("Customise Dashboards", "Customize dashboards", "Drag widgets."),
            130.0
        );
        assert_eq!(
            score("Customise Dashboards", "Customise dashboards", "Drag widgets."),
            15.0
        );
    }

    #[test]
    fn test_non_beginner_query_not_boosted() {
        let prepared = PreparedQuery::new("trace retention");
        assert!(!prepared.is_beginner());
        assert_eq!(prepared.score("Getting Started", "trace"), 1.0);
    }

    #[test]
    fn test_exact_title_beats_loose_body_mentions() {
        let exact = score("data retention", "Data Retention", "Policies.");
        let loose = score("data retention", "Storage", "data is kept; retention varies; data");
        assert!(exact > loose);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert_eq!(score("c++", "Languages", "c++ and c"), 1.0 + 50.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(score("", "Anything", "anything"), 0.0);
    }
}
