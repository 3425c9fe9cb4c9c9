//! Error types for the nextgen-forms library.
//!
//! Failures fall into three groups, and callers treat them differently:
//!
//! * **Input errors**: the image or description the user supplied is not
//!   usable (missing file, unsupported format, empty or over-long text).
//!   No model call has been made; the UI reports these on the intake screen.
//!
//! * **Transport / decode errors**: the model call failed outright, or its
//!   reply is not valid structured data after cleanup. These are not
//!   recovered anywhere in the library and propagate to the process boundary.
//!
//! * A model *refusal* ("this image is not a form") is **not** an error. It
//!   arrives as [`crate::schema::SchemaOutcome::Refusal`] so the UI can show
//!   its warning and offer a restart.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the nextgen-forms library.
#[derive(Debug, Error)]
pub enum FormsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// File extension or content is not one of png / jpg / jpeg.
    #[error("Unsupported image '{name}': expected png, jpg or jpeg")]
    UnsupportedImageType { name: String },

    /// The file claims to be an image but could not be decoded.
    #[error("Image '{name}' could not be decoded: {detail}")]
    InvalidImage { name: String, detail: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The form description is blank.
    #[error("Describe the form you want to create first")]
    EmptyDescription,

    /// The form description exceeds the configured character bound.
    #[error("Description is {len} characters long; the limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model call failed (network, auth, provider error).
    #[error("LLM API error: {message}")]
    Transport { message: String },

    /// The model call did not answer in time.
    #[error("LLM call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// The model reply is not a valid form schema after cleanup.
    #[error("Model reply is not a valid form schema: {detail}")]
    Decode { detail: String, raw: String },

    // ── Form errors ───────────────────────────────────────────────────────
    /// A field declared a type the renderer does not know, and the
    /// configured policy rejects unknown types.
    #[error("Field '{label}' has unsupported type '{kind}'")]
    UnknownFieldType { label: String, kind: String },

    /// A stage index outside `{0, 1, 2}`.
    #[error("Stage {0} does not exist (expected 0, 1 or 2)")]
    InvalidStage(u8),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FormsError {
    /// True for errors caused by what the user typed or picked, which the
    /// intake screen can report without tearing down the session.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FormsError::ImageNotFound { .. }
                | FormsError::PermissionDenied { .. }
                | FormsError::UnsupportedImageType { .. }
                | FormsError::InvalidImage { .. }
                | FormsError::DownloadFailed { .. }
                | FormsError::DownloadTimeout { .. }
                | FormsError::EmptyDescription
                | FormsError::DescriptionTooLong { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_too_long_display() {
        let e = FormsError::DescriptionTooLong { len: 300, max: 256 };
        let msg = e.to_string();
        assert!(msg.contains("300"), "got: {msg}");
        assert!(msg.contains("256"), "got: {msg}");
    }

    #[test]
    fn decode_display_omits_raw_payload() {
        let e = FormsError::Decode {
            detail: "expected value at line 1 column 1".into(),
            raw: "SECRET RAW".into(),
        };
        assert!(e.to_string().contains("line 1"));
        assert!(!e.to_string().contains("SECRET RAW"));
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(FormsError::EmptyDescription.is_input_error());
        assert!(FormsError::UnsupportedImageType { name: "a.gif".into() }.is_input_error());
        assert!(!FormsError::Transport { message: "boom".into() }.is_input_error());
        assert!(!FormsError::Decode {
            detail: "x".into(),
            raw: String::new()
        }
        .is_input_error());
    }

    #[test]
    fn invalid_stage_display() {
        assert!(FormsError::InvalidStage(7).to_string().contains('7'));
    }
}
