//! Build-time metadata embedded by the build script.

/// Short git commit hash at build time, or `"unknown"` outside a checkout.
pub const GIT_HASH: &str = env!("DOCPILOT_GIT_HASH");

/// Unix epoch seconds at build time.
pub const BUILD_TIMESTAMP: &str = env!("DOCPILOT_BUILD_TIMESTAMP");

/// Cargo profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("DOCPILOT_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version with git hash and profile, e.g. `"0.1.0 (abc1234, debug)"`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DOCPILOT_GIT_HASH"),
    ", ",
    env!("DOCPILOT_BUILD_PROFILE"),
    ")"
);

/// `User-Agent` header value sent to model and trace endpoints.
pub fn user_agent() -> String {
    format!("docpilot/{VERSION} ({GIT_HASH})")
}
