//! Fuzz target for the corpus indexer and relevance scorer.
//!
//! Run with: cargo +nightly fuzz run fuzz_section_search
//!
//! The input is split at the first NUL byte into a query and a corpus. The
//! ranked results must respect the limit and be sorted by relevance.

#![no_main]

use docpilot_core::docs::{parse_sections, search::rank};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let (query, corpus) = s.split_once('\0').unwrap_or((s, s));

    let sections = parse_sections(corpus);
    let results = rank(&sections, query, 5);

    assert!(results.len() <= 5);
    assert!(results.iter().all(|r| r.relevance > 0.0));
    assert!(results.windows(2).all(|w| w[0].relevance >= w[1].relevance));
});
