//! Pooled text objects
//!
//! The pool is an arena of [`TextMapper`]s addressed by label index. Growing
//! past the current capacity tears the whole pool down and allocates it again
//! at the new size. A request at or below capacity reuses the existing objects
//! in place, and [`LabelPool::truncate`] then drops the surplus, so the first
//! handles stay stable across a shrinking rebuild.

use super::{LabelError, LabelResult};
use crate::foundation::collections::{HandleMap, TextHandle};
use crate::render::{BackendError, LabelRenderBackend, TextProperty, TextResourceId};

/// Renderer-facing text object carrying one label
#[derive(Debug, Default)]
pub struct TextMapper {
    text: String,
    label_type: i32,
    resource: Option<TextResourceId>,
    resource_stale: bool,
}

impl TextMapper {
    /// Current label text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label type used to pick a text property
    pub const fn label_type(&self) -> i32 {
        self.label_type
    }

    /// Backend resource prepared for the current text, if any
    pub const fn resource(&self) -> Option<TextResourceId> {
        self.resource
    }

    /// Replace the text; returns whether it changed
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.resource_stale = true;
        true
    }

    /// Replace the label type; a new type means a new style
    pub fn set_label_type(&mut self, label_type: i32) {
        if self.label_type != label_type {
            self.label_type = label_type;
            self.resource_stale = true;
        }
    }

    /// Backend resource for the current text, preparing it if needed
    pub fn prepared_resource(
        &mut self,
        backend: &mut dyn LabelRenderBackend,
        style: &TextProperty,
    ) -> Result<TextResourceId, BackendError> {
        if let Some(resource) = self.resource {
            if !self.resource_stale {
                return Ok(resource);
            }
            backend.release_text(resource);
            self.resource = None;
        }
        let resource = backend.prepare_text(&self.text, style)?;
        self.resource = Some(resource);
        self.resource_stale = false;
        Ok(resource)
    }

    /// Free the backend resource, keeping the text
    pub fn release_resource(&mut self, backend: &mut dyn LabelRenderBackend) {
        if let Some(resource) = self.resource.take() {
            backend.release_text(resource);
        }
    }
}

/// Growable arena of text objects
#[derive(Debug, Default)]
pub struct LabelPool {
    objects: HandleMap<TextHandle, TextMapper>,
    handles: Vec<TextHandle>,
    max_capacity: Option<usize>,
    // resources of torn-down objects, released on the next backend access
    orphaned: Vec<TextResourceId>,
}

impl LabelPool {
    /// Create an empty, unbounded pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated text objects
    pub fn capacity(&self) -> usize {
        self.handles.len()
    }

    /// Upper bound on the capacity, if any
    pub const fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    /// Set the upper bound on the label count; existing objects are kept
    pub fn set_max_capacity(&mut self, max_capacity: Option<usize>) {
        self.max_capacity = max_capacity;
    }

    /// Make at least `count` text objects available
    ///
    /// On failure the pool is left exactly as it was.
    pub fn ensure_capacity(&mut self, count: usize) -> LabelResult<()> {
        if let Some(limit) = self.max_capacity {
            if count > limit {
                return Err(LabelError::PoolExhausted { requested: count, limit });
            }
        }
        if count <= self.handles.len() {
            return Ok(());
        }

        let mut handles = Vec::new();
        handles
            .try_reserve_exact(count)
            .map_err(|e| LabelError::AllocationFailed {
                requested: count,
                reason: e.to_string(),
            })?;

        log::debug!("Reallocating label pool: {} -> {count} text objects", self.handles.len());
        self.release_all();
        handles.extend((0..count).map(|_| self.objects.insert(TextMapper::default())));
        self.handles = handles;
        Ok(())
    }

    /// Destroy every object past the first `count`
    ///
    /// Surviving objects keep their handles. Resources held by the dropped
    /// ones are released on the next call that has the backend at hand.
    pub fn truncate(&mut self, count: usize) {
        if count >= self.handles.len() {
            return;
        }
        log::debug!("Shrinking label pool: {} -> {count} text objects", self.handles.len());
        for handle in self.handles.drain(count..) {
            if let Some(resource) = self.objects.remove(handle).and_then(|object| object.resource) {
                self.orphaned.push(resource);
            }
        }
    }

    /// Stable handle of the object at `index`
    pub fn handle(&self, index: usize) -> Option<TextHandle> {
        self.handles.get(index).copied()
    }

    /// Object at `index`
    pub fn get(&self, index: usize) -> Option<&TextMapper> {
        self.objects.get(*self.handles.get(index)?)
    }

    /// Mutable object at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TextMapper> {
        self.objects.get_mut(*self.handles.get(index)?)
    }

    /// Destroy every text object
    ///
    /// Backend resources they held are released on the next call that has
    /// the backend at hand.
    pub fn release_all(&mut self) {
        self.orphaned
            .extend(self.objects.values_mut().filter_map(|object| object.resource.take()));
        self.objects.clear();
        self.handles.clear();
    }

    /// Release resources left behind by torn-down objects
    pub fn release_orphaned(&mut self, backend: &mut dyn LabelRenderBackend) {
        for resource in self.orphaned.drain(..) {
            backend.release_text(resource);
        }
    }

    /// Release every backend resource, keeping all text objects and their text
    pub fn release_graphics_resources(&mut self, backend: &mut dyn LabelRenderBackend) {
        self.release_orphaned(backend);
        for object in self.objects.values_mut() {
            object.release_resource(backend);
        }
    }

    /// Force every prepared resource to be rebuilt on next draw
    pub fn invalidate_resources(&mut self) {
        for object in self.objects.values_mut() {
            object.resource_stale = true;
        }
    }
}
