//! Tracing initialisation for tests.
//!
//! The subscriber is installed at most once per process, so every test may
//! call [`init_test_tracing`] without coordination.

use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset: Docpilot crates at `debug`,
/// everything else at `warn`.
pub const DEFAULT_TEST_FILTER: &str = "warn,docpilot_core=debug,docpilot_config=debug";

/// Install a subscriber that writes to the test-harness writer and honours
/// `RUST_LOG`. Later calls are ignored.
///
/// ```ignore
/// #[tokio::test]
/// async fn answers_question() {
///     docpilot_test_utils::init_test_tracing();
///     // assistant debug logs show up with `cargo test -- --nocapture`
/// }
/// ```
pub fn init_test_tracing() {
    init_test_tracing_with(DEFAULT_TEST_FILTER);
}

/// Like [`init_test_tracing`], with an explicit fallback filter directive.
pub fn init_test_tracing_with(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init();
}
