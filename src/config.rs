//! Configuration types for the analysis service.
//!
//! Job behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. Connection settings for the language-model
//! endpoint live in [`LlmEndpoint`] so the API key never travels with the
//! job config.

use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Query used when the caller submits none (or only whitespace).
pub const DEFAULT_QUERY: &str = "Analyze this financial document for investment insights";

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model served by [`DEFAULT_BASE_URL`].
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Configuration for an analysis job.
///
/// # Example
/// ```rust
/// use findoc_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .temperature(0.2)
///     .retry_delay_ms(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Sampling temperature for every LLM call. Default: 0.3.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per call. Default: 1000.
    ///
    /// The summary prompt asks for at most ~700 words, which fits.
    pub max_tokens: usize,

    /// Total attempts of the agent pipeline when it hits a rate limit. Default: 3.
    pub max_attempts: u32,

    /// Fixed delay between pipeline attempts in milliseconds. Default: 2000.
    pub retry_delay_ms: u64,

    /// Query substituted for an empty one.
    pub default_query: String,

    /// Directory holding uploads for the duration of one job. Default: `data`.
    pub upload_dir: PathBuf,

    /// Request body limit for `/analyze`. Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1000,
            max_attempts: 3,
            retry_delay_ms: 2000,
            default_query: DEFAULT_QUERY.to_string(),
            upload_dir: PathBuf::from("data"),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Trim the caller's query, falling back to [`Self::default_query`].
    pub fn effective_query(&self, query: Option<&str>) -> String {
        match query.map(str::trim) {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => self.default_query.clone(),
        }
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    pub fn default_query(mut self, query: impl Into<String>) -> Self {
        self.config.default_query = query.into();
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.max_attempts == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.default_query.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "default_query must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Where and how to reach the chat-completions endpoint.
#[derive(Clone)]
pub struct LlmEndpoint {
    /// Base URL; `/chat/completions` is appended. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,
    pub api_key: String,
    /// Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Per-request timeout. Default: 120.
    pub timeout_secs: u64,
}

impl LlmEndpoint {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full URL of the chat-completions route.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for LlmEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_behaviour() {
        let c = AnalyzerConfig::default();
        assert_eq!(c.temperature, 0.3);
        assert_eq!(c.max_tokens, 1000);
        assert_eq!(c.max_attempts, 3);
        assert_eq!(c.retry_delay_ms, 2000);
        assert_eq!(c.upload_dir, PathBuf::from("data"));
    }

    #[test]
    fn builder_rejects_zero_attempts() {
        let err = AnalyzerConfig::builder().max_attempts(0).build().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AnalyzerConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn effective_query_trims_and_falls_back() {
        let c = AnalyzerConfig::default();
        assert_eq!(c.effective_query(Some("  margins?  ")), "margins?");
        assert_eq!(c.effective_query(Some("   ")), DEFAULT_QUERY);
        assert_eq!(c.effective_query(None), DEFAULT_QUERY);
    }

    #[test]
    fn endpoint_debug_redacts_key() {
        let e = LlmEndpoint::new("gsk_secret");
        let dbg = format!("{e:?}");
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn completions_url_handles_trailing_slash() {
        let e = LlmEndpoint::new("k").base_url("http://localhost:9000/v1/");
        assert_eq!(e.completions_url(), "http://localhost:9000/v1/chat/completions");
    }
}
