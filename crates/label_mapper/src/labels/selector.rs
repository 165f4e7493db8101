//! Attribute selection: which values label a point
//!
//! One policy applies to every failure: a point whose tuple cannot be read
//! (missing attribute, unknown field column, tuple index past the end of the
//! array, out-of-range component under [`ComponentRangePolicy::Skip`]) gets
//! no label at all.

use crate::data::{AttributeKind, DataArray, LabelValue, PointSet, ScalarKind};
use serde::{Deserialize, Serialize};

/// Which data labels the points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelMode {
    /// Point identifiers
    #[default]
    Ids,
    /// Active scalars
    Scalars,
    /// Active vectors
    Vectors,
    /// Active normals
    Normals,
    /// Active texture coordinates
    TCoords,
    /// Active tensors
    Tensors,
    /// A field data column, chosen by the mapper's [`FieldDataRef`]
    FieldData,
}

impl LabelMode {
    /// The point attribute read in this mode, if any
    pub const fn attribute(self) -> Option<AttributeKind> {
        match self {
            Self::Scalars => Some(AttributeKind::Scalars),
            Self::Vectors => Some(AttributeKind::Vectors),
            Self::Normals => Some(AttributeKind::Normals),
            Self::TCoords => Some(AttributeKind::TCoords),
            Self::Tensors => Some(AttributeKind::Tensors),
            Self::Ids | Self::FieldData => None,
        }
    }
}

/// Field data column reference; an index and a name are mutually exclusive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldDataRef {
    /// Column by position
    Index(usize),
    /// Column by name
    Name(String),
}

impl Default for FieldDataRef {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// What to do when the labeled component is past the end of a tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComponentRangePolicy {
    /// Label the last component instead
    #[default]
    Clamp,
    /// Leave the point unlabeled
    Skip,
}

/// A label mode resolved into the data it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeQuery<'r> {
    /// Point identifiers
    Ids,
    /// A primary point attribute
    Attribute(AttributeKind),
    /// A field data column
    FieldData(&'r FieldDataRef),
}

impl<'r> AttributeQuery<'r> {
    /// Resolve a mode against the mapper's field reference
    pub const fn new(mode: LabelMode, field: &'r FieldDataRef) -> Self {
        match mode {
            LabelMode::Ids => Self::Ids,
            LabelMode::FieldData => Self::FieldData(field),
            LabelMode::Scalars => Self::Attribute(AttributeKind::Scalars),
            LabelMode::Vectors => Self::Attribute(AttributeKind::Vectors),
            LabelMode::Normals => Self::Attribute(AttributeKind::Normals),
            LabelMode::TCoords => Self::Attribute(AttributeKind::TCoords),
            LabelMode::Tensors => Self::Attribute(AttributeKind::Tensors),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    Ids(&'a PointSet),
    Attribute(&'a DataArray),
    Field(&'a DataArray),
    Missing,
}

/// Reads label tuples out of one point set
///
/// The array lookup happens once in [`AttributeSelector::new`]; selecting a
/// point afterwards is an index computation plus a copy into a caller buffer.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSelector<'a> {
    source: Source<'a>,
    component: Option<usize>,
    policy: ComponentRangePolicy,
}

impl<'a> AttributeSelector<'a> {
    /// Resolve `query` against `block`
    ///
    /// # Arguments
    /// * `component` - `None` labels every component, `Some(i)` only component `i`
    /// * `policy` - How an out-of-range `component` is handled
    ///
    /// Ids ignore `component`: an identifier is always a single value.
    pub fn new(
        block: &'a PointSet,
        query: AttributeQuery<'_>,
        component: Option<usize>,
        policy: ComponentRangePolicy,
    ) -> Self {
        let source = match query {
            AttributeQuery::Ids => Source::Ids(block),
            AttributeQuery::Attribute(kind) => match block.point_data().attribute(kind) {
                Some(array) => Source::Attribute(array),
                None => {
                    log::warn!("No {} to label on a {}-point block", kind.name(), block.number_of_points());
                    Source::Missing
                }
            },
            AttributeQuery::FieldData(FieldDataRef::Name(name)) => {
                match block.field_data().array_by_name(name) {
                    Some(array) => Source::Field(array),
                    None => {
                        log::warn!("Field data array '{name}' not found, points left unlabeled");
                        Source::Missing
                    }
                }
            }
            AttributeQuery::FieldData(FieldDataRef::Index(index)) => {
                match block.field_data().array(*index) {
                    Some(array) => Source::Field(array),
                    None => {
                        log::warn!(
                            "Field data array index {index} out of range ({} arrays), points left unlabeled",
                            block.field_data().len()
                        );
                        Source::Missing
                    }
                }
            }
        };
        Self { source, component, policy }
    }

    /// Whether the requested data exists on this block
    pub const fn is_available(&self) -> bool {
        !matches!(self.source, Source::Missing)
    }

    /// Kind of the selected values, used to pick a default format
    pub const fn kind(&self) -> Option<ScalarKind> {
        match self.source {
            Source::Ids(_) => Some(ScalarKind::IdType),
            Source::Attribute(array) | Source::Field(array) => Some(array.kind()),
            Source::Missing => None,
        }
    }

    /// Write the tuple for `point` into `out`
    ///
    /// `out` is cleared first. Returns `false` when the point gets no label.
    pub fn select_into(&self, point: usize, out: &mut Vec<LabelValue<'a>>) -> bool {
        out.clear();
        match self.source {
            Source::Missing => false,
            Source::Ids(block) => match block.point_id(point) {
                Some(id) => {
                    out.push(LabelValue::Int(id));
                    true
                }
                None => false,
            },
            Source::Attribute(array) => self.push_tuple(array, point, out),
            // a single-tuple column is shared by every point
            Source::Field(array) if array.tuple_count() == 1 => self.push_tuple(array, 0, out),
            Source::Field(array) => self.push_tuple(array, point, out),
        }
    }

    /// Tuple for `point`, or `None` when the point gets no label
    pub fn select(&self, point: usize) -> Option<Vec<LabelValue<'a>>> {
        let mut out = Vec::new();
        self.select_into(point, &mut out).then_some(out)
    }

    fn push_tuple(&self, array: &'a DataArray, tuple: usize, out: &mut Vec<LabelValue<'a>>) -> bool {
        if tuple >= array.tuple_count() {
            return false;
        }
        let Some(requested) = self.component else {
            return array.tuple_into(tuple, out);
        };
        let component = if requested < array.components() {
            requested
        } else {
            match self.policy {
                ComponentRangePolicy::Clamp => array.components() - 1,
                ComponentRangePolicy::Skip => return false,
            }
        };
        match array.value(tuple, component) {
            Some(value) => {
                out.push(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;

    fn block() -> PointSet {
        let mut set = PointSet::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        set.set_attribute(
            AttributeKind::Vectors,
            DataArray::named("v", 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        );
        set.add_field_array(DataArray::named("temp", 1, vec![20.5_f32, 21.5]).unwrap());
        set.add_field_array(DataArray::named("site", 1, vec!["A7"]).unwrap());
        set
    }

    fn floats(values: &[f64]) -> Vec<LabelValue<'static>> {
        values.iter().copied().map(LabelValue::Float).collect()
    }

    #[test]
    fn test_all_components_in_order() {
        let set = block();
        let query = AttributeQuery::Attribute(AttributeKind::Vectors);
        let selector = AttributeSelector::new(&set, query, None, ComponentRangePolicy::Clamp);
        assert_eq!(selector.select(1), Some(floats(&[4.0, 5.0, 6.0])));
        assert_eq!(selector.kind(), Some(ScalarKind::Float64));
    }

    #[test]
    fn test_single_component() {
        let set = block();
        let query = AttributeQuery::Attribute(AttributeKind::Vectors);
        let selector = AttributeSelector::new(&set, query, Some(1), ComponentRangePolicy::Clamp);
        assert_eq!(selector.select(0), Some(floats(&[2.0])));
        assert_eq!(selector.select(1), Some(floats(&[5.0])));
    }

    #[test]
    fn test_out_of_range_component_policies() {
        let set = block();
        let query = AttributeQuery::Attribute(AttributeKind::Vectors);

        let clamp = AttributeSelector::new(&set, query, Some(7), ComponentRangePolicy::Clamp);
        assert_eq!(clamp.select(0), Some(floats(&[3.0])));

        let skip = AttributeSelector::new(&set, query, Some(7), ComponentRangePolicy::Skip);
        assert_eq!(skip.select(0), None);
    }

    #[test]
    fn test_missing_attribute_skips_every_point() {
        let set = block();
        let field = FieldDataRef::default();
        let query = AttributeQuery::new(LabelMode::Normals, &field);
        let selector = AttributeSelector::new(&set, query, None, ComponentRangePolicy::Clamp);
        assert!(!selector.is_available());
        assert_eq!(selector.kind(), None);
        assert_eq!(selector.select(0), None);
    }

    #[test]
    fn test_ids_ignore_component_filter() {
        let mut set = block();
        set.set_point_ids(vec![10, 11]).unwrap();
        let selector = AttributeSelector::new(&set, AttributeQuery::Ids, Some(2), ComponentRangePolicy::Skip);
        assert_eq!(selector.select(1), Some(vec![LabelValue::Int(11)]));
        assert_eq!(selector.select(2), None);
        assert_eq!(selector.kind(), Some(ScalarKind::IdType));
    }

    #[test]
    fn test_field_data_by_name_and_index() {
        let set = block();
        let by_name = FieldDataRef::Name("temp".to_string());
        let selector = AttributeSelector::new(&set, AttributeQuery::FieldData(&by_name), None, ComponentRangePolicy::Clamp);
        assert_eq!(selector.select(1), Some(floats(&[21.5])));
        assert_eq!(selector.kind(), Some(ScalarKind::Float32));

        let by_index = FieldDataRef::Index(0);
        let selector = AttributeSelector::new(&set, AttributeQuery::FieldData(&by_index), None, ComponentRangePolicy::Clamp);
        assert_eq!(selector.select(0), Some(floats(&[20.5])));

        let missing = FieldDataRef::Name("pressure".to_string());
        let selector = AttributeSelector::new(&set, AttributeQuery::FieldData(&missing), None, ComponentRangePolicy::Clamp);
        assert_eq!(selector.select(0), None);

        let past_end = FieldDataRef::Index(9);
        let selector = AttributeSelector::new(&set, AttributeQuery::FieldData(&past_end), None, ComponentRangePolicy::Clamp);
        assert!(!selector.is_available());
    }

    #[test]
    fn test_single_tuple_column_is_shared() {
        let set = block();
        let site = FieldDataRef::Index(1);
        let selector = AttributeSelector::new(&set, AttributeQuery::FieldData(&site), None, ComponentRangePolicy::Clamp);
        assert_eq!(selector.select(0), Some(vec![LabelValue::Text("A7")]));
        assert_eq!(selector.select(1), Some(vec![LabelValue::Text("A7")]));
        assert_eq!(selector.kind(), Some(ScalarKind::String));
    }

    #[test]
    fn test_short_attribute_array_skips_trailing_points() {
        let mut set = block();
        set.set_attribute(AttributeKind::Scalars, DataArray::new(1, vec![1_i32]).unwrap());
        let selector = AttributeSelector::new(
            &set,
            AttributeQuery::Attribute(AttributeKind::Scalars),
            None,
            ComponentRangePolicy::Clamp,
        );
        assert_eq!(selector.select(0), Some(vec![LabelValue::Int(1)]));
        assert_eq!(selector.select(1), None);
    }
}
