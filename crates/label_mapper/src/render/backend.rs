//! Label Render Backend Trait
//!
//! Defines the interface between the label mapper and text rendering backends.
//! Keeps the mapper independent of how glyphs are rasterized and drawn.

use super::{TextProperty, Viewport};
use crate::foundation::math::Point3;

/// Error type returned by backends
pub type BackendError = Box<dyn std::error::Error>;

/// Backend-side resource holding a prepared text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextResourceId(pub u64);

/// Which render pass is consuming the labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Opaque geometry pass; labels are rebuilt here when stale
    OpaqueGeometry,
    /// Overlay pass drawn on top of the scene
    Overlay,
}

/// Backend-agnostic label rendering interface
pub trait LabelRenderBackend {
    /// Begin a label pass
    fn begin_pass(&mut self, pass: RenderPass, viewport: &Viewport) -> Result<(), BackendError>;

    /// Prepare (shape, upload) a text run and return a handle to it
    ///
    /// Called once per label text; the handle is reused by later passes
    /// until the text changes or resources are released.
    fn prepare_text(
        &mut self,
        text: &str,
        style: &TextProperty,
    ) -> Result<TextResourceId, BackendError>;

    /// Draw a prepared text run at an anchor position
    ///
    /// # Arguments
    /// * `resource` - Handle returned by [`Self::prepare_text`]
    /// * `text` - The label string the resource was prepared from
    /// * `position` - Anchor in the mapper's output coordinate system
    /// * `style` - Style the label should be drawn with
    fn draw_text(
        &mut self,
        pass: RenderPass,
        resource: TextResourceId,
        text: &str,
        position: &Point3,
        style: &TextProperty,
    ) -> Result<(), BackendError>;

    /// Free a prepared text run
    fn release_text(&mut self, resource: TextResourceId);

    /// End a label pass
    fn end_pass(&mut self, pass: RenderPass) -> Result<(), BackendError>;
}
