//! Pipeline stages for turning user input into a form schema.
//!
//! ```text
//! input ──▶ encode ──▶ gateway ──▶ parse
//! (path/URL)  (base64)   (model)     (cleanup + decode)
//! ```
//!
//! 1. [`input`]  : read or download the uploaded image and validate it
//! 2. [`encode`] : base64-wrap the image for the multimodal request
//! 3. [`gateway`]: the single model call; the only stage with network I/O
//!    to the model
//! 4. [`parse`]  : strip fences, decode the reply into a schema or refusal
//!
//! Text descriptions skip the first two stages.

pub mod encode;
pub mod gateway;
pub mod input;
pub mod parse;
