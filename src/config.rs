//! Configuration types for form generation.
//!
//! Every knob lives in [`GeneratorConfig`], built via
//! [`GeneratorConfigBuilder`]. The binary maps its CLI flags (and their
//! `NEXTFORMS_*` environment variables) onto the builder; library callers set
//! only what they care about.

use crate::error::FormsError;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default model for the image endpoint.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
/// Default model for the text endpoint.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4-turbo";
/// Upper bound on the free-text description, in characters.
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 256;

/// Configuration for turning user input into a form schema.
///
/// # Example
/// ```rust
/// use nextgen_forms::GeneratorConfig;
///
/// let config = GeneratorConfig::builder()
///     .temperature(0.2)
///     .vision_model("gpt-4o")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Model used for image input. If None, [`DEFAULT_VISION_MODEL`].
    pub vision_model: Option<String>,

    /// Model used for text input. If None, [`DEFAULT_TEXT_MODEL`].
    pub text_model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider used for both endpoints.
    /// Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Schema extraction wants the same answer for the same form; low
    /// temperature keeps labels and types stable between attempts.
    pub temperature: f32,

    /// Maximum output tokens for the image endpoint. Default: 500.
    pub image_max_tokens: usize,

    /// Maximum output tokens for the text endpoint. Default: 500.
    pub text_max_tokens: usize,

    /// Maximum description length in characters. Default: 256.
    pub max_description_chars: usize,

    /// What the renderer does with field types it does not know.
    pub unknown_fields: UnknownFieldPolicy,

    /// Download timeout for image URLs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-call model timeout in seconds; 0 waits indefinitely. Default: 120.
    pub api_timeout_secs: u64,

    /// Optional observer for request start / completion events.
    pub progress_callback: Option<crate::progress::ProgressCallback>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vision_model: None,
            text_model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            image_max_tokens: 500,
            text_max_tokens: 500,
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
            unknown_fields: UnknownFieldPolicy::default(),
            download_timeout_secs: 120,
            api_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("vision_model", &self.vision_model)
            .field("text_model", &self.text_model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("image_max_tokens", &self.image_max_tokens)
            .field("text_max_tokens", &self.text_max_tokens)
            .field("max_description_chars", &self.max_description_chars)
            .field("unknown_fields", &self.unknown_fields)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl GeneratorConfig {
    /// Create a new builder for `GeneratorConfig`.
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn vision_model_or_default(&self) -> &str {
        self.vision_model.as_deref().unwrap_or(DEFAULT_VISION_MODEL)
    }

    pub fn text_model_or_default(&self) -> &str {
        self.text_model.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = Some(model.into());
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn image_max_tokens(mut self, n: usize) -> Self {
        self.config.image_max_tokens = n;
        self
    }

    pub fn text_max_tokens(mut self, n: usize) -> Self {
        self.config.text_max_tokens = n;
        self
    }

    pub fn max_description_chars(mut self, n: usize) -> Self {
        self.config.max_description_chars = n;
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.config.unknown_fields = policy;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: crate::progress::ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GeneratorConfig, FormsError> {
        let c = &self.config;
        if c.image_max_tokens == 0 || c.text_max_tokens == 0 {
            return Err(FormsError::InvalidConfig(
                "max tokens must be ≥ 1".into(),
            ));
        }
        if c.max_description_chars == 0 {
            return Err(FormsError::InvalidConfig(
                "description limit must be ≥ 1 character".into(),
            ));
        }
        for (what, model) in [("vision", &c.vision_model), ("text", &c.text_model)] {
            if model.as_deref().is_some_and(|m| m.trim().is_empty()) {
                return Err(FormsError::InvalidConfig(format!(
                    "{what} model name is empty"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the renderer treats a field whose type is not text / email / number /
/// textarea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Omit the field: no widget, no submission entry. (default)
    #[default]
    Drop,
    /// Fail rendering with [`FormsError::UnknownFieldType`].
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GeneratorConfig::default();
        assert_eq!(c.temperature, 0.2);
        assert_eq!(c.image_max_tokens, 500);
        assert_eq!(c.max_description_chars, 256);
        assert_eq!(c.unknown_fields, UnknownFieldPolicy::Drop);
        assert_eq!(c.vision_model_or_default(), DEFAULT_VISION_MODEL);
        assert_eq!(c.text_model_or_default(), DEFAULT_TEXT_MODEL);
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = GeneratorConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_zero_tokens() {
        let err = GeneratorConfig::builder().text_max_tokens(0).build().unwrap_err();
        assert!(matches!(err, FormsError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_model() {
        let err = GeneratorConfig::builder().vision_model("  ").build().unwrap_err();
        assert!(err.to_string().contains("vision"));
    }

    #[test]
    fn debug_hides_provider() {
        let c = GeneratorConfig::default();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("GeneratorConfig"));
        assert!(!dbg.contains("progress_callback"));
    }
}
