//! Renderer-facing side of the label pipeline
//!
//! The mapper never rasterizes text. It hands finished strings, anchor
//! positions and styles to a [`LabelRenderBackend`] supplied by the host.

mod backend;
mod text_property;
mod viewport;

pub use backend::{BackendError, LabelRenderBackend, RenderPass, TextResourceId};
pub use text_property::{FontStyle, HorizontalJustification, TextProperty, VerticalJustification};
pub use viewport::Viewport;
