//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text to `AppConfig::parse()`, which covers both TOML
//! decoding and validation of every section.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(config) = docpilot_config::AppConfig::parse(s)
    {
        // Validation is idempotent.
        assert!(config.validate().is_ok());
    }
});
