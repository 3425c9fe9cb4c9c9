//! Image encoding: uploaded bytes → base64 `ImageData` for the vision call.
//!
//! The upload is forwarded as-is (no re-encode); it was already validated as
//! png or jpeg by [`crate::pipeline::input`]. `detail: "high"` lets
//! GPT-4-class models tile the image so small field labels stay legible.

use crate::pipeline::input::ImageUpload;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Encode a validated upload for the model request.
pub fn encode_image(upload: &ImageUpload) -> ImageData {
    let b64 = STANDARD.encode(&upload.bytes);
    debug!("Encoded {} → {} bytes base64", upload.name, b64.len());

    ImageData::new(b64, upload.kind.mime_type()).with_detail("high")
}
