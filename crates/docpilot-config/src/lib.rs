#![deny(unsafe_code)]

//! Configuration loading and validation for Docpilot.
//!
//! Loads TOML configuration files and validates them against expected schemas.
//! Provides the [`AppConfig`] type as the central configuration structure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language model configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Documentation corpus and search configuration.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Assistant persona configuration.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Trace export configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which LLM backend to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

/// Language model configuration.
///
/// ## TOML Example
///
/// ```toml
/// [llm]
/// provider = "openai"
/// model = "gpt-4o"
/// api_key_env = "OPENAI_API_KEY"
/// base_url = "http://localhost:11434/v1/chat/completions"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider backend.
    #[serde(default)]
    pub provider: LlmProviderKind,

    /// Inline API key. Prefer `api_key_env` outside of local testing.
    #[serde(default)]
    pub api_key: String,

    /// Environment variable consulted when `api_key` is empty.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier. An empty model means the LLM is not configured.
    #[serde(default)]
    pub model: String,

    /// Optional base URL for OpenAI-compatible endpoints.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0–2.0).
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            api_key: String::new(),
            api_key_env: default_api_key_env(),
            model: String::new(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// The API key to use: the inline value, or the value of `api_key_env`.
    ///
    /// Returns `None` when neither yields a non-empty key.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Some(key),
            _ => {
                debug!(env = %self.api_key_env, "no API key in config or environment");
                None
            }
        }
    }
}

fn default_api_key_env() -> String {
    "DOCPILOT_LLM_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

/// Documentation corpus and search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Path to the flat documentation file.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// Number of sections handed to the model per search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Maximum characters of section content included per result.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    /// Cache parsed sections between searches (invalidated on content change).
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            search_limit: default_search_limit(),
            snippet_chars: default_snippet_chars(),
            cache: true,
        }
    }
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("docs/llms.txt")
}

fn default_search_limit() -> usize {
    5
}

fn default_snippet_chars() -> usize {
    500
}

fn default_true() -> bool {
    true
}

/// Assistant persona configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Product the assistant answers questions about.
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Full replacement for the built-in system instructions.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            system_prompt: None,
        }
    }
}

fn default_product_name() -> String {
    "the product".to_string()
}

/// Trace export configuration.
///
/// Tracing is silently disabled unless `enabled` is set and an endpoint
/// with credentials is provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Ingestion endpoint URL.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// Environment tag attached to every trace.
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            public_key: String::new(),
            secret_key: String::new(),
            environment: default_environment(),
        }
    }
}

impl TelemetryConfig {
    /// Whether enough is configured to export traces.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.endpoint.is_empty()
    }
}

fn default_environment() -> String {
    "development".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be in [0.0, 2.0], got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "llm.max_tokens must be non-zero".to_string(),
            ));
        }
        if let Some(ref url) = self.llm.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "llm.base_url must be an http(s) URL, got {url:?}"
            )));
        }

        if self.docs.corpus_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "docs.corpus_path must not be empty".to_string(),
            ));
        }
        if self.docs.search_limit == 0 {
            return Err(ConfigError::Validation(
                "docs.search_limit must be at least 1".to_string(),
            ));
        }
        if self.docs.snippet_chars == 0 {
            return Err(ConfigError::Validation(
                "docs.snippet_chars must be at least 1".to_string(),
            ));
        }

        if self.assistant.product_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assistant.product_name must not be empty".to_string(),
            ));
        }

        if self.telemetry.enabled {
            if self.telemetry.endpoint.is_empty() {
                return Err(ConfigError::Validation(
                    "telemetry.endpoint is required when telemetry is enabled".to_string(),
                ));
            }
            if self.telemetry.public_key.is_empty() || self.telemetry.secret_key.is_empty() {
                return Err(ConfigError::Validation(
                    "telemetry.public_key and telemetry.secret_key are required when telemetry is enabled"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, LlmProviderKind::Anthropic);
        assert_eq!(config.llm.api_key_env, "DOCPILOT_LLM_API_KEY");
        assert_eq!(config.docs.search_limit, 5);
        assert_eq!(config.docs.snippet_chars, 500);
        assert!(config.docs.cache);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.docs.corpus_path, PathBuf::from("docs/llms.txt"));
        assert!(config.llm.model.is_empty());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [llm]
            provider = "openai"
            model = "gpt-4o"
            api_key = "sk-test"
            base_url = "http://localhost:11434/v1/chat/completions"
            temperature = 0.2

            [docs]
            corpus_path = "/srv/docs/llms.txt"
            search_limit = 3
            cache = false

            [assistant]
            product_name = "Tracely"

            [telemetry]
            enabled = true
            endpoint = "https://traces.example.com/api/public/ingestion"
            public_key = "pk"
            secret_key = "sk"
            environment = "production"

            [logging]
            level = "debug"
            json = true
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.llm.provider, LlmProviderKind::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.docs.search_limit, 3);
        assert!(!config.docs.cache);
        assert_eq!(config.assistant.product_name, "Tracely");
        assert!(config.telemetry.is_active());
        assert_eq!(config.telemetry.environment, "production");
        assert!(config.logging.json);
    }

    #[test]
    fn test_validation_rejects_zero_search_limit() {
        let toml = r#"
            [docs]
            search_limit = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_temperature() {
        let toml = r#"
            [llm]
            temperature = 3.5
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let toml = r#"
            [llm]
            base_url = "localhost:11434"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_provider() {
        let toml = r#"
            [llm]
            provider = "cohere"
        "#;
        assert!(matches!(
            AppConfig::parse(toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_telemetry_requires_credentials() {
        let toml = r#"
            [telemetry]
            enabled = true
            endpoint = "https://traces.example.com"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("public_key"));
    }

    #[test]
    fn test_telemetry_disabled_without_endpoint() {
        let config = AppConfig::default();
        assert!(!config.telemetry.is_active());
    }

    #[test]
    fn test_inline_api_key_wins() {
        let config = LlmConfig {
            api_key: "inline".to_string(),
            api_key_env: "DOCPILOT_TEST_UNSET_VARIABLE".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("inline"));
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: "DOCPILOT_TEST_UNSET_VARIABLE".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key(), None);
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docpilot.toml");
        tokio::fs::write(&path, b"[docs]\nsearch_limit = 7\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.docs.search_limit, 7);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/file.toml")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[")
            .await
            .unwrap();

        let result = AppConfig::load(&path).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let reparsed = AppConfig::parse(&rendered).unwrap();
        assert_eq!(reparsed.docs.search_limit, config.docs.search_limit);
    }
}
