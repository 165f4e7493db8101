//! Labeled data mapper
//!
//! Draws one text label per input point. Labels are rebuilt lazily: the
//! opaque-geometry pass compares the last build stamp against the input, the
//! mapper configuration, and the transform, and runs a full rebuild only when
//! one of them is newer. The overlay pass always draws the current set.

use super::coordinates::{CoordinateMapper, CoordinateSystem, SharedTransform};
use super::pool::LabelPool;
use super::selector::{AttributeQuery, AttributeSelector, ComponentRangePolicy, FieldDataRef, LabelMode};
use super::text::build_label_into;
use super::{LabelError, LabelResult};
use crate::data::{LabelValue, SharedData};
use crate::foundation::collections::TextHandle;
use crate::foundation::math::Point3;
use crate::foundation::time::{Stopwatch, TimeStamp};
use crate::format::{FormatError, FormatResolver};
use crate::render::{LabelRenderBackend, RenderPass, TextProperty, Viewport};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Read-only view of one built label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelEntry<'a> {
    /// Label text
    pub text: &'a str,
    /// Anchor in the output coordinate system
    pub position: Point3,
    /// Label type selecting the text property
    pub label_type: i32,
    /// Identity of the pooled text object holding the label
    pub handle: TextHandle,
}

/// Builds and draws text labels at dataset points
///
/// # Example
///
/// ```
/// use label_mapper::prelude::*;
///
/// let mut points = PointSet::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
/// points.set_point_ids(vec![10, 11]).unwrap();
///
/// let mut mapper = LabeledDataMapper::new();
/// mapper.set_input(Some(DataObject::from(points).into_shared()));
/// mapper.build_labels().unwrap();
///
/// let texts: Vec<_> = mapper.labels().map(|label| label.text.to_string()).collect();
/// assert_eq!(texts, ["10", "11"]);
/// ```
pub struct LabeledDataMapper {
    input: Option<SharedData>,
    label_mode: LabelMode,
    field_data: FieldDataRef,
    labeled_component: Option<usize>,
    component_policy: ComponentRangePolicy,
    formats: FormatResolver,
    coordinate_system: CoordinateSystem,
    transform: Option<SharedTransform>,
    default_text_property: TextProperty,
    text_properties: BTreeMap<i32, TextProperty>,
    label_type_array: Option<String>,
    mtime: TimeStamp,
    build_time: TimeStamp,
    pool: LabelPool,
    label_positions: Vec<Point3>,
    number_of_labels: usize,
    scratch_text: String,
}

impl Default for LabeledDataMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl LabeledDataMapper {
    /// Create a mapper labeling point ids with the default format
    pub fn new() -> Self {
        Self {
            input: None,
            label_mode: LabelMode::Ids,
            field_data: FieldDataRef::default(),
            labeled_component: None,
            component_policy: ComponentRangePolicy::Clamp,
            formats: FormatResolver::new(),
            coordinate_system: CoordinateSystem::World,
            transform: None,
            default_text_property: TextProperty::default(),
            text_properties: BTreeMap::new(),
            label_type_array: None,
            mtime: TimeStamp::now(),
            build_time: TimeStamp::new(),
            pool: LabelPool::new(),
            label_positions: Vec::new(),
            number_of_labels: 0,
            scratch_text: String::new(),
        }
    }

    /// Mark the configuration as modified, forcing a rebuild
    pub fn modified(&mut self) {
        self.mtime.modified();
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Set the input; swapping inputs always forces a rebuild
    pub fn set_input(&mut self, input: Option<SharedData>) {
        let same = match (&self.input, &input) {
            (Some(current), Some(new)) => Rc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.input = input;
            self.modified();
        }
    }

    /// Current input
    pub const fn input(&self) -> Option<&SharedData> {
        self.input.as_ref()
    }

    /// Choose which data labels the points
    pub fn set_label_mode(&mut self, mode: LabelMode) {
        if self.label_mode != mode {
            self.label_mode = mode;
            self.modified();
        }
    }

    /// Current label mode
    pub const fn label_mode(&self) -> LabelMode {
        self.label_mode
    }

    /// Set the printf-style format applied to each component
    ///
    /// `None` or `""` restores the per-kind default. An invalid template is
    /// rejected and the current one kept.
    pub fn set_label_format(&mut self, format: Option<&str>) -> Result<(), FormatError> {
        if self.formats.set_user_format(format)? {
            self.modified();
        }
        Ok(())
    }

    /// Explicit label format, if set
    pub fn label_format(&self) -> Option<&str> {
        self.formats.user_format()
    }

    /// Label only one component (`Some(i)`) or all of them (`None`)
    pub fn set_labeled_component(&mut self, component: Option<usize>) {
        if self.labeled_component != component {
            self.labeled_component = component;
            self.modified();
        }
    }

    /// Integer form of [`Self::set_labeled_component`]: negative means all
    pub fn set_labeled_component_index(&mut self, component: i32) {
        self.set_labeled_component(usize::try_from(component).ok());
    }

    /// Labeled component, `None` for all
    pub const fn labeled_component(&self) -> Option<usize> {
        self.labeled_component
    }

    /// Handling of a labeled component past the end of a tuple
    pub fn set_component_range_policy(&mut self, policy: ComponentRangePolicy) {
        if self.component_policy != policy {
            self.component_policy = policy;
            self.modified();
        }
    }

    /// Current component range policy
    pub const fn component_range_policy(&self) -> ComponentRangePolicy {
        self.component_policy
    }

    /// Label the field data column at `index`; clears any column name
    pub fn set_field_data_array(&mut self, index: usize) {
        self.set_field_data_ref(FieldDataRef::Index(index));
    }

    /// Label the field data column called `name`; overrides any column index
    pub fn set_field_data_name(&mut self, name: &str) {
        self.set_field_data_ref(FieldDataRef::Name(name.to_string()));
    }

    /// Set the field data column reference
    pub fn set_field_data_ref(&mut self, field: FieldDataRef) {
        if self.field_data != field {
            self.field_data = field;
            self.modified();
        }
    }

    /// Field data column reference
    pub const fn field_data_ref(&self) -> &FieldDataRef {
        &self.field_data
    }

    /// Field data column index, unless a name is set
    pub const fn field_data_array(&self) -> Option<usize> {
        match self.field_data {
            FieldDataRef::Index(index) => Some(index),
            FieldDataRef::Name(_) => None,
        }
    }

    /// Field data column name, if set
    pub fn field_data_name(&self) -> Option<&str> {
        match &self.field_data {
            FieldDataRef::Name(name) => Some(name),
            FieldDataRef::Index(_) => None,
        }
    }

    /// Output coordinate system of the label anchors
    pub fn set_coordinate_system(&mut self, system: CoordinateSystem) {
        if self.coordinate_system != system {
            self.coordinate_system = system;
            self.modified();
        }
    }

    /// Current output coordinate system
    pub const fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Transform used in display mode
    pub fn set_transform(&mut self, transform: Option<SharedTransform>) {
        let same = match (&self.transform, &transform) {
            (Some(current), Some(new)) => Rc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.transform = transform;
            self.modified();
        }
    }

    /// Current transform
    pub const fn transform(&self) -> Option<&SharedTransform> {
        self.transform.as_ref()
    }

    /// Text property for labels of `label_type`; type 0 is the default style
    pub fn set_label_text_property(&mut self, label_type: i32, property: TextProperty) {
        if label_type == 0 {
            if self.default_text_property == property {
                return;
            }
            self.default_text_property = property;
        } else {
            // registering a type is a change even when the style matches type 0
            if self.text_properties.get(&label_type) == Some(&property) {
                return;
            }
            self.text_properties.insert(label_type, property);
        }
        self.pool.invalidate_resources();
        self.modified();
    }

    /// Text property registered for `label_type`
    pub fn label_text_property(&self, label_type: i32) -> Option<&TextProperty> {
        if label_type == 0 {
            Some(&self.default_text_property)
        } else {
            self.text_properties.get(&label_type)
        }
    }

    /// Name of an integer point array giving each label's type
    pub fn set_label_type_array_name(&mut self, name: Option<&str>) {
        if self.label_type_array.as_deref() != name {
            self.label_type_array = name.map(str::to_string);
            self.modified();
        }
    }

    /// Label type array name, if set
    pub fn label_type_array_name(&self) -> Option<&str> {
        self.label_type_array.as_deref()
    }

    /// Upper bound on the number of pooled labels
    pub fn set_max_labels(&mut self, max_labels: Option<usize>) {
        if self.pool.max_capacity() != max_labels {
            self.pool.set_max_capacity(max_labels);
            self.modified();
        }
    }

    /// Current label bound
    pub const fn max_labels(&self) -> Option<usize> {
        self.pool.max_capacity()
    }

    // ---------------------------------------------------------------------
    // Cache state
    // ---------------------------------------------------------------------

    /// Latest stamp of the configuration, the transform, and the input
    pub fn modified_time(&self) -> TimeStamp {
        let mut time = self.mtime;
        if let Some(transform) = &self.transform {
            time = time.max(transform.borrow().modified_time());
        }
        if let Some(input) = &self.input {
            time = time.max(input.borrow().modified_time());
        }
        time
    }

    /// Stamp of the last completed rebuild
    pub const fn build_time(&self) -> TimeStamp {
        self.build_time
    }

    /// Whether the next opaque pass will rebuild the labels
    pub fn is_stale(&self) -> bool {
        self.build_time.is_never() || self.modified_time() > self.build_time
    }

    // ---------------------------------------------------------------------
    // Built labels
    // ---------------------------------------------------------------------

    /// Number of labels in the current set
    pub const fn number_of_labels(&self) -> usize {
        self.number_of_labels
    }

    /// Text of label `index`
    pub fn label_text(&self, index: usize) -> Option<&str> {
        if index >= self.number_of_labels {
            return None;
        }
        self.pool.get(index).map(super::pool::TextMapper::text)
    }

    /// Anchor of label `index` in the output coordinate system
    pub fn label_position(&self, index: usize) -> Option<&Point3> {
        self.label_positions.get(index)
    }

    /// Identity of the pooled text object behind label `index`
    pub fn label_handle(&self, index: usize) -> Option<TextHandle> {
        if index >= self.number_of_labels {
            return None;
        }
        self.pool.handle(index)
    }

    /// Every label in the current set, in point order
    pub fn labels(&self) -> impl Iterator<Item = LabelEntry<'_>> + '_ {
        (0..self.number_of_labels).filter_map(move |index| {
            let object = self.pool.get(index)?;
            Some(LabelEntry {
                text: object.text(),
                position: *self.label_positions.get(index)?,
                label_type: object.label_type(),
                handle: self.pool.handle(index)?,
            })
        })
    }

    /// Pooled text objects
    pub const fn pool(&self) -> &LabelPool {
        &self.pool
    }

    /// Rebuild the labels if anything they depend on changed
    ///
    /// Returns whether a rebuild ran. On error the previous label set is
    /// kept and the mapper stays stale, so the next call retries.
    pub fn build_labels(&mut self) -> LabelResult<bool> {
        if !self.is_stale() {
            log::trace!("Labels up to date ({} labels)", self.number_of_labels);
            return Ok(false);
        }

        let stopwatch = Stopwatch::start_new();
        let Some(input) = self.input.clone() else {
            log::debug!("No input to label");
            self.number_of_labels = 0;
            self.label_positions.clear();
            self.pool.truncate(0);
            self.build_time = TimeStamp::now();
            return Ok(true);
        };
        let data = input.borrow();
        let blocks = data.blocks();

        let query = AttributeQuery::new(self.label_mode, &self.field_data);
        let selectors: Vec<AttributeSelector<'_>> = blocks
            .iter()
            .map(|block| AttributeSelector::new(block, query, self.labeled_component, self.component_policy))
            .collect();

        // Everything that can fail happens before the current set is touched.
        let mut tuple: Vec<LabelValue<'_>> = Vec::new();
        let mut count = 0;
        for (block, selector) in blocks.iter().zip(&selectors) {
            let Some(kind) = selector.kind() else { continue };
            self.formats.resolve(kind)?;
            count += (0..block.number_of_points())
                .filter(|&point| selector.select_into(point, &mut tuple))
                .count();
        }
        self.label_positions
            .try_reserve(count.saturating_sub(self.label_positions.len()))
            .map_err(|e| LabelError::AllocationFailed {
                requested: count,
                reason: e.to_string(),
            })?;
        self.pool.ensure_capacity(count)?;

        let coordinates = {
            let transform = self.transform.as_ref().map(|t| t.borrow());
            CoordinateMapper::new(self.coordinate_system, transform.as_deref())
        };

        self.label_positions.clear();
        let mut index = 0;
        for (block, selector) in blocks.iter().zip(&selectors) {
            let Some(kind) = selector.kind() else { continue };
            let format = self.formats.resolve(kind)?;
            let types = self
                .label_type_array
                .as_deref()
                .and_then(|name| block.point_data().array(name));

            for (point, position) in block.points().iter().enumerate() {
                if !selector.select_into(point, &mut tuple) {
                    continue;
                }
                self.scratch_text.clear();
                build_label_into(&tuple, format, &mut self.scratch_text);
                let label_type = types.and_then(|array| array.value(point, 0)).map_or(0, label_type_of);

                if let Some(object) = self.pool.get_mut(index) {
                    object.set_text(&self.scratch_text);
                    object.set_label_type(label_type);
                }
                self.label_positions.push(coordinates.map(position));
                index += 1;
            }
        }
        debug_assert_eq!(index, count);

        self.pool.truncate(count);
        self.number_of_labels = count;
        self.build_time = TimeStamp::now();
        log::debug!(
            "Built {count} labels from {} blocks in {:.3} ms",
            blocks.len(),
            stopwatch.elapsed_millis()
        );
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// Opaque geometry pass: rebuild if stale, then draw every label
    pub fn render_opaque_geometry(&mut self, viewport: &Viewport, backend: &mut dyn LabelRenderBackend) {
        if let Err(err) = self.build_labels() {
            log::error!("Label rebuild failed, keeping previous labels: {err}");
        }
        self.draw(RenderPass::OpaqueGeometry, viewport, backend);
    }

    /// Overlay pass: draw the current label set
    pub fn render_overlay(&mut self, viewport: &Viewport, backend: &mut dyn LabelRenderBackend) {
        self.draw(RenderPass::Overlay, viewport, backend);
    }

    /// Free backend resources held by the labels; the labels themselves stay
    pub fn release_graphics_resources(&mut self, backend: &mut dyn LabelRenderBackend) {
        self.pool.release_graphics_resources(backend);
    }

    fn draw(&mut self, pass: RenderPass, viewport: &Viewport, backend: &mut dyn LabelRenderBackend) {
        self.pool.release_orphaned(backend);
        if self.number_of_labels == 0 || viewport.is_empty() {
            return;
        }
        if let Err(err) = backend.begin_pass(pass, viewport) {
            log::warn!("Backend refused {pass:?} pass: {err}");
            return;
        }

        for (index, position) in self.label_positions.iter().enumerate().take(self.number_of_labels) {
            let Some(object) = self.pool.get_mut(index) else { break };
            let style = self
                .text_properties
                .get(&object.label_type())
                .unwrap_or(&self.default_text_property);
            let resource = match object.prepared_resource(backend, style) {
                Ok(resource) => resource,
                Err(err) => {
                    log::warn!("Failed to prepare label '{}': {err}", object.text());
                    continue;
                }
            };
            if let Err(err) = backend.draw_text(pass, resource, object.text(), position, style) {
                log::warn!("Failed to draw label '{}': {err}", object.text());
            }
        }

        if let Err(err) = backend.end_pass(pass) {
            log::warn!("Backend failed to end {pass:?} pass: {err}");
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn label_type_of(value: LabelValue<'_>) -> i32 {
    match value {
        LabelValue::Int(v) => i32::try_from(v).unwrap_or(0),
        LabelValue::UInt(v) => i32::try_from(v).unwrap_or(0),
        LabelValue::Float(v) => v as i32,
        LabelValue::Text(_) => 0,
    }
}

impl fmt::Display for LabeledDataMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LabeledDataMapper")?;
        match &self.input {
            Some(input) => writeln!(f, "  Input: {} points", input.borrow().number_of_points())?,
            None => writeln!(f, "  Input: (none)")?,
        }
        writeln!(f, "  Label Mode: {:?}", self.label_mode)?;
        writeln!(f, "  Label Format: {}", self.label_format().unwrap_or("(default)"))?;
        match self.labeled_component {
            Some(component) => writeln!(f, "  Labeled Component: {component}")?,
            None => writeln!(f, "  Labeled Component: (all)")?,
        }
        writeln!(f, "  Component Range Policy: {:?}", self.component_policy)?;
        match &self.field_data {
            FieldDataRef::Index(index) => writeln!(f, "  Field Data Array: {index}")?,
            FieldDataRef::Name(name) => writeln!(f, "  Field Data Name: {name}")?,
        }
        writeln!(f, "  Coordinate System: {:?}", self.coordinate_system)?;
        writeln!(f, "  Transform: {}", if self.transform.is_some() { "set" } else { "(none)" })?;
        writeln!(f, "  Label Type Array: {}", self.label_type_array.as_deref().unwrap_or("(none)"))?;
        writeln!(f, "  Text Properties: {}", self.text_properties.len() + 1)?;
        write!(f, "  Number Of Labels: {}", self.number_of_labels)
    }
}
