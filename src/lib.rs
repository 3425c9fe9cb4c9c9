//! # nextgen-forms
//!
//! Generate fillable forms from a picture of a form or a short description,
//! using a hosted language model.
//!
//! ## Flow
//!
//! ```text
//! Intake ──▶ Preview ──▶ Fill
//!   │  image / text   │  schema or refusal   │  FormSubmission
//!   └──── Try Again ◀─┘                      └── Start Over ──▶ Intake
//! ```
//!
//! 1. **Intake**: the user uploads a PNG/JPEG or types up to 256 characters
//! 2. **Generate**: one model call returns a JSON schema `{title, description, fields}`
//! 3. **Preview**: the schema is shown with disabled widgets, or a warning if
//!    the model said the input is not a form
//! 4. **Fill**: live widgets collect values into an ordered label → value map
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nextgen_forms::{FormGenerator, GeneratorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let generator = FormGenerator::from_config(GeneratorConfig::default())?;
//!     let generation = generator
//!         .generate_from_text("A job application with name, email, years of experience and a cover letter")
//!         .await?;
//!     match generation.outcome.schema() {
//!         Some(schema) => println!("{}", serde_json::to_string_pretty(schema)?),
//!         None => eprintln!("not a form"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `tui`   | via `cli` | Terminal UI (ratatui + crossterm + arboard) |
//! | `cli`   | on      | Enables the `nextforms` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable default features when using only the library:
//! ```toml
//! nextgen-forms = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod schema;
pub mod session;

#[cfg(feature = "tui")]
pub mod ui;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GeneratorConfig, GeneratorConfigBuilder, UnknownFieldPolicy};
pub use error::FormsError;
pub use generate::{generate_sync, write_schema_to_file, FormGenerator, FormRequest};
pub use output::{Generation, GenerationStats, SourceImage};
pub use pipeline::gateway::{Endpoint, LlmGateway, ModelGateway, ModelRequest};
pub use pipeline::input::ImageUpload;
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use render::{render, LiveForm, RenderMode, RenderedForm, Widget, WidgetKind};
pub use schema::{FieldKind, FormField, FormSchema, FormSubmission, SchemaOutcome};
pub use session::{PreviewView, SessionContext, Stage};
