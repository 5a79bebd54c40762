//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use std::path::Path;

use docpilot_config::{AppConfig, LlmProviderKind};

/// Fluent builder for [`AppConfig`] in tests.
///
/// Starts from a config that passes validation and resolves a model and API
/// key, so `Assistant::from_config` succeeds without touching the environment.
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .corpus_path(corpus.path())
///     .product_name("Acme")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.llm.model = "test-model".to_string();
        config.llm.api_key = "test-key".to_string();
        // Never fall back to a real key from the developer's shell.
        config.llm.api_key_env = "DOCPILOT_TEST_UNSET_KEY".to_string();
        Self { config }
    }

    pub fn provider(mut self, provider: LlmProviderKind) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.llm.model = model.to_string();
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.config.llm.api_key = key.to_string();
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.llm.base_url = Some(url.to_string());
        self
    }

    pub fn corpus_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.docs.corpus_path = path.as_ref().to_path_buf();
        self
    }

    pub fn search_limit(mut self, limit: usize) -> Self {
        self.config.docs.search_limit = limit;
        self
    }

    pub fn snippet_chars(mut self, chars: usize) -> Self {
        self.config.docs.snippet_chars = chars;
        self
    }

    pub fn product_name(mut self, name: &str) -> Self {
        self.config.assistant.product_name = name.to_string();
        self
    }

    pub fn system_prompt(mut self, prompt: &str) -> Self {
        self.config.assistant.system_prompt = Some(prompt.to_string());
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
