//! Markdown rendering.
//!
//! The rendering pipeline is kept pure: it accepts a markdown body, produces
//! deterministic HTML output, and never touches the network or the clock.
//! Callers that must always obtain a fragment use `RenderService::render_lossy`.

mod service;
mod types;

pub use service::{ComrakRenderService, render_service};
pub use types::{RenderError, RenderOutput, RenderRequest, RenderService};
