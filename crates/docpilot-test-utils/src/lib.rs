#![deny(unsafe_code)]

//! Shared test utilities for the Docpilot workspace.
//!
//! Provides config builders, a scripted language model, corpus fixtures, a
//! recording trace sink, and tracing helpers so that individual crate tests
//! stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member and use it
//! from that member's `tests/` directory:
//!
//! ```toml
//! [dev-dependencies]
//! docpilot-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod corpus;
pub mod provider;
pub mod trace;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use corpus::{SAMPLE_CORPUS, TestCorpus, sample_search};
pub use provider::{ScriptedProvider, text_response, tool_call, tool_call_response};
pub use trace::RecordingTraceSink;
pub use tracing_setup::init_test_tracing;
