//! Output types returned by generation.

use crate::pipeline::gateway::Endpoint;
use crate::schema::SchemaOutcome;
use serde::Serialize;

/// Result of one generation request.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    /// Decoded schema or refusal.
    pub outcome: SchemaOutcome,
    /// The model's reply as received, before cleanup.
    #[serde(skip)]
    pub raw: String,
    /// Which endpoint answered.
    pub endpoint: Endpoint,
    /// The uploaded image, for image requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<SourceImage>,
    pub stats: GenerationStats,
}

/// Name and size of the image a form was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Timing and size of one model call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    /// Model name used for the call.
    pub model: String,
    /// Wall-clock time of the model call in milliseconds.
    pub duration_ms: u64,
    /// Byte length of the raw reply.
    pub reply_len: usize,
}
