//! Progress-callback trait for generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GeneratorConfigBuilder::progress_callback`] to learn
//! when the model call starts and how it ended. The one-shot CLI uses this
//! to drive a spinner; the terminal UI draws its own "Working…" screen.
//!
//! # Example
//!
//! ```rust
//! use nextgen_forms::{Endpoint, GenerationProgressCallback, GeneratorConfig};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl GenerationProgressCallback for Log {
//!     fn on_request_start(&self, endpoint: Endpoint) {
//!         eprintln!("asking the {endpoint} model…");
//!     }
//! }
//!
//! let config = GeneratorConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::gateway::Endpoint;
use std::sync::Arc;

/// Called by [`crate::generate::FormGenerator`] around each model call.
///
/// All methods have default no-op implementations.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called just before the request is sent.
    fn on_request_start(&self, endpoint: Endpoint) {
        let _ = endpoint;
    }

    /// Called when the model replied and the reply was decoded.
    ///
    /// # Arguments
    /// * `reply_len`  : byte length of the raw reply
    /// * `duration_ms`: wall-clock time of the model call
    /// * `refused`    : the model said the input is not a form
    fn on_request_complete(&self, endpoint: Endpoint, reply_len: usize, duration_ms: u64, refused: bool) {
        let _ = (endpoint, reply_len, duration_ms, refused);
    }

    /// Called when the call or the decode failed.
    fn on_request_error(&self, endpoint: Endpoint, error: &str) {
        let _ = (endpoint, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GeneratorConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
