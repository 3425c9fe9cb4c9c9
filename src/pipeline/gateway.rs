//! The seam to the hosted model: one request in, raw reply text out.
//!
//! [`ModelGateway`] is the only place the crate touches the network for
//! schema generation. It is a trait so the generator, the session and the UI
//! can be exercised against scripted replies; [`LlmGateway`] is the
//! production implementation on top of `edgequake-llm`.
//!
//! Each call is made exactly once. There is no retry: a failed attempt is
//! reported as [`FormsError::Transport`] (or [`FormsError::ApiTimeout`]) and
//! the caller decides what to do.

use crate::config::GeneratorConfig;
use crate::error::FormsError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Which logical model endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Image-capable model.
    Vision,
    /// Text-only model.
    Text,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Vision => f.write_str("vision"),
            Endpoint::Text => f.write_str("text"),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub endpoint: Endpoint,
    pub prompt: String,
    pub image: Option<ImageData>,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Anything that can answer a [`ModelRequest`] with raw text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send the request and return the model's raw reply.
    async fn complete(&self, request: &ModelRequest) -> Result<String, FormsError>;
}

/// [`ModelGateway`] backed by two `edgequake-llm` providers.
pub struct LlmGateway {
    vision: Arc<dyn LLMProvider>,
    text: Arc<dyn LLMProvider>,
    api_timeout_secs: u64,
}

impl LlmGateway {
    pub fn new(vision: Arc<dyn LLMProvider>, text: Arc<dyn LLMProvider>, api_timeout_secs: u64) -> Self {
        Self {
            vision,
            text,
            api_timeout_secs,
        }
    }

    /// Build both endpoints from the config; see [`resolve_provider`].
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, FormsError> {
        let vision = resolve_provider(config, Endpoint::Vision)?;
        let text = resolve_provider(config, Endpoint::Text)?;
        Ok(Self::new(vision, text, config.api_timeout_secs))
    }

    fn provider(&self, endpoint: Endpoint) -> &Arc<dyn LLMProvider> {
        match endpoint {
            Endpoint::Vision => &self.vision,
            Endpoint::Text => &self.text,
        }
    }
}

#[async_trait]
impl ModelGateway for LlmGateway {
    async fn complete(&self, request: &ModelRequest) -> Result<String, FormsError> {
        let message = match request.image {
            Some(ref image) => ChatMessage::user_with_images(&request.prompt, vec![image.clone()]),
            None => ChatMessage::user(&request.prompt),
        };
        let messages = vec![message];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };

        let call = self.provider(request.endpoint).chat(&messages, Some(&options));
        let result = if self.api_timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(self.api_timeout_secs), call)
                .await
                .map_err(|_| FormsError::ApiTimeout {
                    secs: self.api_timeout_secs,
                })?
        } else {
            call.await
        };

        match result {
            Ok(response) => {
                debug!(
                    "{} model: {} input tokens, {} output tokens",
                    request.endpoint, response.prompt_tokens, response.completion_tokens
                );
                Ok(response.content)
            }
            Err(e) => {
                warn!("{} model call failed: {}", request.endpoint, e);
                Err(FormsError::Transport {
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Build the production gateway as a trait object.
pub fn resolve_gateway(config: &GeneratorConfig) -> Result<Arc<dyn ModelGateway>, FormsError> {
    Ok(Arc::new(LlmGateway::from_config(config)?))
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, FormsError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        FormsError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the provider for one endpoint, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used for both endpoints.
/// 2. **Named provider** (`config.provider_name`) with the endpoint's model.
/// 3. **`EDGEQUAKE_LLM_PROVIDER`**, with `EDGEQUAKE_MODEL` overriding the
///    model of both endpoints when set.
/// 4. **`OPENAI_API_KEY`** present → OpenAI with the endpoint's model.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
fn resolve_provider(config: &GeneratorConfig, endpoint: Endpoint) -> Result<Arc<dyn LLMProvider>, FormsError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = match endpoint {
        Endpoint::Vision => config.vision_model_or_default(),
        Endpoint::Text => config.text_model_or_default(),
    };

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let Ok(prov) = std::env::var("EDGEQUAKE_LLM_PROVIDER") {
        if !prov.is_empty() {
            let env_model = std::env::var("EDGEQUAKE_MODEL").ok().filter(|m| !m.is_empty());
            return create_provider(&prov, env_model.as_deref().unwrap_or(model));
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| FormsError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_display() {
        assert_eq!(Endpoint::Vision.to_string(), "vision");
        assert_eq!(Endpoint::Text.to_string(), "text");
    }

    #[tokio::test]
    async fn mock_gateway_answers_requests() {
        let mut mock = MockModelGateway::new();
        mock.expect_complete()
            .withf(|req| req.endpoint == Endpoint::Text && req.image.is_none())
            .times(1)
            .returning(|_| Ok("{}".to_string()));

        let req = ModelRequest {
            endpoint: Endpoint::Text,
            prompt: "p".into(),
            image: None,
            temperature: 0.2,
            max_tokens: 10,
        };
        assert_eq!(mock.complete(&req).await.unwrap(), "{}");
    }
}
