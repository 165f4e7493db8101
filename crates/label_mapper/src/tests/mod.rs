//! Integration tests for the label pipeline
//!
//! [`RecordingBackend`] stands in for a real text renderer and records every
//! call so tests can assert on what would have been drawn.


use crate::foundation::math::Point3;
use crate::render::{BackendError, LabelRenderBackend, RenderPass, TextProperty, TextResourceId, Viewport};

/// One recorded `draw_text` call
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub pass: RenderPass,
    pub resource: TextResourceId,
    pub text: String,
    pub position: Point3,
    pub style: TextProperty,
}

/// Backend that records calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_resource: u64,
    pub passes: Vec<RenderPass>,
    pub prepared: Vec<String>,
    pub released: Vec<TextResourceId>,
    pub live: Vec<TextResourceId>,
    pub draws: Vec<DrawCall>,
    pub fail_prepare: bool,
}

impl RecordingBackend {
    /// Texts drawn in `pass`, in draw order
    pub fn drawn_texts(&self, pass: RenderPass) -> Vec<String> {
        self.draws
            .iter()
            .filter(|draw| draw.pass == pass)
            .map(|draw| draw.text.clone())
            .collect()
    }

    /// Forget every recorded call, keeping live resources
    pub fn clear(&mut self) {
        self.passes.clear();
        self.prepared.clear();
        self.released.clear();
        self.draws.clear();
    }
}

impl LabelRenderBackend for RecordingBackend {
    fn begin_pass(&mut self, pass: RenderPass, _viewport: &Viewport) -> Result<(), BackendError> {
        self.passes.push(pass);
        Ok(())
    }

    fn prepare_text(&mut self, text: &str, _style: &TextProperty) -> Result<TextResourceId, BackendError> {
        if self.fail_prepare {
            return Err(format!("cannot shape '{text}'").into());
        }
        self.next_resource += 1;
        let resource = TextResourceId(self.next_resource);
        self.prepared.push(text.to_string());
        self.live.push(resource);
        Ok(resource)
    }

    fn draw_text(
        &mut self,
        pass: RenderPass,
        resource: TextResourceId,
        text: &str,
        position: &Point3,
        style: &TextProperty,
    ) -> Result<(), BackendError> {
        self.draws.push(DrawCall {
            pass,
            resource,
            text: text.to_string(),
            position: *position,
            style: style.clone(),
        });
        Ok(())
    }

    fn release_text(&mut self, resource: TextResourceId) {
        self.released.push(resource);
        self.live.retain(|live| *live != resource);
    }

    fn end_pass(&mut self, _pass: RenderPass) -> Result<(), BackendError> {
        Ok(())
    }
}
