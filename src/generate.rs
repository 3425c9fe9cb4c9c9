//! Generation entry points: input → prompt → model → schema.
//!
//! [`FormGenerator`] owns a [`ModelGateway`] and the config. Each request
//! makes exactly one model call and returns a [`Generation`], which carries
//! either a schema or a refusal. Input validation runs before the call, so a
//! bad upload or an over-long description never reaches the network.

use crate::config::GeneratorConfig;
use crate::error::FormsError;
use crate::output::{Generation, GenerationStats, SourceImage};
use crate::pipeline::gateway::{resolve_gateway, Endpoint, ModelGateway, ModelRequest};
use crate::pipeline::input::{self, ImageUpload};
use crate::pipeline::{encode, parse};
use crate::prompts;
use crate::schema::FormSchema;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What the user handed in on the intake screen.
#[derive(Debug, Clone)]
pub enum FormRequest {
    /// Free-text description of the form.
    Text(String),
    /// Local path or http(s) URL of an image.
    ImageSource(String),
    /// An image already read into memory.
    Image(ImageUpload),
}

/// Turns intake input into a form schema via one model call.
pub struct FormGenerator {
    gateway: Arc<dyn ModelGateway>,
    config: GeneratorConfig,
}

impl FormGenerator {
    pub fn new(gateway: Arc<dyn ModelGateway>, config: GeneratorConfig) -> Self {
        Self { gateway, config }
    }

    /// Build the production gateway from the config.
    ///
    /// # Errors
    /// [`FormsError::ProviderNotConfigured`] when no provider can be resolved.
    pub fn from_config(config: GeneratorConfig) -> Result<Self, FormsError> {
        let gateway = resolve_gateway(&config)?;
        Ok(Self::new(gateway, config))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Dispatch on the request kind.
    pub async fn generate(&self, request: FormRequest) -> Result<Generation, FormsError> {
        match request {
            FormRequest::Text(description) => self.generate_from_text(&description).await,
            FormRequest::ImageSource(source) => self.generate_from_source(&source).await,
            FormRequest::Image(upload) => self.generate_from_image(&upload).await,
        }
    }

    /// Generate from a text description.
    ///
    /// # Errors
    /// [`FormsError::EmptyDescription`] or [`FormsError::DescriptionTooLong`]
    /// before any call; otherwise the call and decode errors.
    pub async fn generate_from_text(&self, description: &str) -> Result<Generation, FormsError> {
        let prompt = prompts::text_prompt(description, self.config.max_description_chars)?;
        info!("Generating form from description ({} chars)", description.trim().chars().count());
        let request = ModelRequest {
            endpoint: Endpoint::Text,
            prompt,
            image: None,
            temperature: self.config.temperature,
            max_tokens: self.config.text_max_tokens,
        };
        self.run(request).await
    }

    /// Generate from an image already in memory.
    pub async fn generate_from_image(&self, upload: &ImageUpload) -> Result<Generation, FormsError> {
        info!(
            "Generating form from image '{}' ({}x{}, {} bytes)",
            upload.name,
            upload.width,
            upload.height,
            upload.bytes.len()
        );
        let request = ModelRequest {
            endpoint: Endpoint::Vision,
            prompt: prompts::image_prompt(),
            image: Some(encode::encode_image(upload)),
            temperature: self.config.temperature,
            max_tokens: self.config.image_max_tokens,
        };
        let mut generation = self.run(request).await?;
        generation.image = Some(SourceImage {
            name: upload.name.clone(),
            width: upload.width,
            height: upload.height,
        });
        Ok(generation)
    }

    /// Generate from a local path or an http(s) URL.
    pub async fn generate_from_source(&self, source: &str) -> Result<Generation, FormsError> {
        let upload = input::resolve_image(source, self.config.download_timeout_secs).await?;
        self.generate_from_image(&upload).await
    }

    async fn run(&self, request: ModelRequest) -> Result<Generation, FormsError> {
        let endpoint = request.endpoint;
        let model = match endpoint {
            Endpoint::Vision => self.config.vision_model_or_default(),
            Endpoint::Text => self.config.text_model_or_default(),
        }
        .to_string();

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_request_start(endpoint);
        }

        let start = Instant::now();
        let decoded = match self.gateway.complete(&request).await {
            Ok(raw) => parse::decode_outcome(&raw).map(|outcome| (raw, outcome)),
            Err(e) => Err(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let (raw, outcome) = match decoded {
            Ok(pair) => pair,
            Err(e) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_request_error(endpoint, &e.to_string());
                }
                return Err(e);
            }
        };

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_request_complete(endpoint, raw.len(), duration_ms, outcome.is_refusal());
        }

        match outcome.schema() {
            Some(schema) => info!(
                "Generated '{}' with {} fields in {}ms",
                schema.title,
                schema.fields.len(),
                duration_ms
            ),
            None => info!("Model refused the input after {}ms", duration_ms),
        }
        debug!("Raw reply: {}", raw);

        Ok(Generation {
            outcome,
            stats: GenerationStats {
                model,
                duration_ms,
                reply_len: raw.len(),
            },
            raw,
            endpoint,
            image: None,
        })
    }
}

/// Synchronous wrapper around [`FormGenerator::generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(generator: &FormGenerator, request: FormRequest) -> Result<Generation, FormsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FormsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generator.generate(request))
}

/// Write a schema as pretty JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_schema_to_file(schema: &FormSchema, path: impl AsRef<Path>) -> Result<(), FormsError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(schema)
        .map_err(|e| FormsError::Internal(format!("schema serialisation: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FormsError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json)
        .await
        .map_err(|e| FormsError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| FormsError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
