//! Terminal UI for the Intake → Preview → Fill flow.
//!
//! The event loop lives in the `nextforms` binary; this module provides the
//! state ([`App`]) and a pure [`draw`] function over it.

pub mod app;
mod draw;
pub mod field_renderer;

pub use app::{App, Command, IntakeFocus, PreviewButton, StatusLine};
pub use draw::draw;
