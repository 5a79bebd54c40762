//! Tools the model may call, and the executor that runs them.

pub mod executor;
pub mod registry;

pub use executor::{ToolError, ToolExecutor, format_results};
pub use registry::{RegisteredTool, SEARCH_DOCUMENTATION, ToolRegistry};
