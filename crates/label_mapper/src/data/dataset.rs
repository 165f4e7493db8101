//! Point sets, their attributes, and composite inputs

use super::{DataArray, DataError, DataResult};
use crate::foundation::math::Point3;
use crate::foundation::time::TimeStamp;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Input shared between the caller and a mapper
///
/// The caller keeps mutating the data; the mapper only reads it and compares
/// its modification stamp against the last build.
pub type SharedData = Rc<RefCell<DataObject>>;

/// Primary point attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
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
}

impl AttributeKind {
    /// Every attribute kind, in storage order
    pub const ALL: [Self; 5] = [
        Self::Scalars,
        Self::Vectors,
        Self::Normals,
        Self::TCoords,
        Self::Tensors,
    ];

    const fn slot(self) -> usize {
        match self {
            Self::Scalars => 0,
            Self::Vectors => 1,
            Self::Normals => 2,
            Self::TCoords => 3,
            Self::Tensors => 4,
        }
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalars => "scalars",
            Self::Vectors => "vectors",
            Self::Normals => "normals",
            Self::TCoords => "texture coordinates",
            Self::Tensors => "tensors",
        }
    }
}

/// Per-point arrays: the active attributes plus any other named arrays
#[derive(Debug, Clone, Default)]
pub struct PointData {
    attributes: [Option<DataArray>; 5],
    arrays: Vec<DataArray>,
}

impl PointData {
    /// The active array for an attribute kind
    pub fn attribute(&self, kind: AttributeKind) -> Option<&DataArray> {
        self.attributes[kind.slot()].as_ref()
    }

    /// A named point array, searching the generic arrays before the attributes
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays
            .iter()
            .chain(self.attributes.iter().flatten())
            .find(|array| array.name() == Some(name))
    }

    /// Number of generic (non-attribute) arrays
    pub fn number_of_arrays(&self) -> usize {
        self.arrays.len()
    }
}

/// Auxiliary columns attached to a dataset
///
/// A column holds either one tuple per point or a single tuple shared by all
/// points.
#[derive(Debug, Clone, Default)]
pub struct FieldData {
    arrays: Vec<DataArray>,
}

impl FieldData {
    /// Column by position
    pub fn array(&self, index: usize) -> Option<&DataArray> {
        self.arrays.get(index)
    }

    /// Column by name
    pub fn array_by_name(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|array| array.name() == Some(name))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Iterate over the columns in order
    pub fn iter(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.iter()
    }
}

/// Ordered points with attribute data
///
/// Every mutator bumps the set's modification stamp.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<Point3>,
    point_ids: Option<Vec<i64>>,
    point_data: PointData,
    field_data: FieldData,
    mtime: TimeStamp,
}

impl PointSet {
    /// Create a point set from positions
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            mtime: TimeStamp::now(),
            ..Default::default()
        }
    }

    /// Number of points
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// All positions
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Position of one point
    pub fn point(&self, index: usize) -> Option<&Point3> {
        self.points.get(index)
    }

    /// Identifier of one point: the explicit id if one was set, else its index
    pub fn point_id(&self, index: usize) -> Option<i64> {
        match &self.point_ids {
            Some(ids) => ids.get(index).copied(),
            None => (index < self.points.len()).then(|| i64::try_from(index).ok()).flatten(),
        }
    }

    /// Explicit identifiers, if set
    pub fn point_ids(&self) -> Option<&[i64]> {
        self.point_ids.as_deref()
    }

    /// Point attributes
    pub const fn point_data(&self) -> &PointData {
        &self.point_data
    }

    /// Field data columns
    pub const fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    /// Replace the positions
    ///
    /// Explicit ids that no longer match the point count are dropped.
    pub fn set_points(&mut self, points: Vec<Point3>) {
        if self.point_ids.as_ref().is_some_and(|ids| ids.len() != points.len()) {
            log::warn!("Dropping point ids after point count changed to {}", points.len());
            self.point_ids = None;
        }
        self.points = points;
        self.modified();
    }

    /// Assign explicit point identifiers, one per point
    pub fn set_point_ids(&mut self, ids: Vec<i64>) -> DataResult<()> {
        if ids.len() != self.points.len() {
            return Err(DataError::IdCountMismatch {
                ids: ids.len(),
                points: self.points.len(),
            });
        }
        self.point_ids = Some(ids);
        self.modified();
        Ok(())
    }

    /// Set the active array for an attribute kind
    pub fn set_attribute(&mut self, kind: AttributeKind, array: DataArray) {
        self.point_data.attributes[kind.slot()] = Some(array);
        self.modified();
    }

    /// Remove the active array for an attribute kind
    pub fn remove_attribute(&mut self, kind: AttributeKind) -> Option<DataArray> {
        let removed = self.point_data.attributes[kind.slot()].take();
        if removed.is_some() {
            self.modified();
        }
        removed
    }

    /// Add a generic point array
    pub fn add_point_array(&mut self, array: DataArray) {
        self.point_data.arrays.push(array);
        self.modified();
    }

    /// Append a field data column, returning its index
    pub fn add_field_array(&mut self, array: DataArray) -> usize {
        self.field_data.arrays.push(array);
        self.modified();
        self.field_data.arrays.len() - 1
    }

    /// Mark the set as modified
    pub fn modified(&mut self) {
        self.mtime.modified();
    }

    /// Last modification stamp
    pub const fn modified_time(&self) -> TimeStamp {
        self.mtime
    }
}

/// Ordered collection of point-set blocks labeled as one input
#[derive(Debug, Clone, Default)]
pub struct CompositeDataSet {
    blocks: Vec<PointSet>,
    mtime: TimeStamp,
}

impl CompositeDataSet {
    /// Create an empty composite
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            mtime: TimeStamp::now(),
        }
    }

    /// Append a block, returning its index
    pub fn add_block(&mut self, block: PointSet) -> usize {
        self.blocks.push(block);
        self.mtime.modified();
        self.blocks.len() - 1
    }

    /// Remove and return a block
    pub fn remove_block(&mut self, index: usize) -> Option<PointSet> {
        (index < self.blocks.len()).then(|| {
            self.mtime.modified();
            self.blocks.remove(index)
        })
    }

    /// Block by index
    pub fn block(&self, index: usize) -> Option<&PointSet> {
        self.blocks.get(index)
    }

    /// Mutable block access; block mutators bump the block's own stamp
    pub fn block_mut(&mut self, index: usize) -> Option<&mut PointSet> {
        self.blocks.get_mut(index)
    }

    /// All blocks in order
    pub fn blocks(&self) -> &[PointSet] {
        &self.blocks
    }

    /// Latest stamp of the composite or any block
    pub fn modified_time(&self) -> TimeStamp {
        self.blocks
            .iter()
            .map(PointSet::modified_time)
            .fold(self.mtime, std::cmp::max)
    }
}

/// Mapper input
#[derive(Debug, Clone)]
pub enum DataObject {
    /// A single point set
    PointSet(PointSet),
    /// Several point sets labeled in block order
    Composite(CompositeDataSet),
}

impl DataObject {
    /// Wrap into a shared handle for [`crate::labels::LabeledDataMapper::set_input`]
    pub fn into_shared(self) -> SharedData {
        Rc::new(RefCell::new(self))
    }

    /// Leaf point sets in labeling order
    pub fn blocks(&self) -> &[PointSet] {
        match self {
            Self::PointSet(set) => std::slice::from_ref(set),
            Self::Composite(composite) => composite.blocks(),
        }
    }

    /// Total points over all blocks
    pub fn number_of_points(&self) -> usize {
        self.blocks().iter().map(PointSet::number_of_points).sum()
    }

    /// Latest modification stamp of any part of the input
    pub fn modified_time(&self) -> TimeStamp {
        match self {
            Self::PointSet(set) => set.modified_time(),
            Self::Composite(composite) => composite.modified_time(),
        }
    }

    /// The single point set, if this is not a composite
    pub const fn as_point_set(&self) -> Option<&PointSet> {
        match self {
            Self::PointSet(set) => Some(set),
            Self::Composite(_) => None,
        }
    }

    /// Mutable access to the single point set
    pub fn as_point_set_mut(&mut self) -> Option<&mut PointSet> {
        match self {
            Self::PointSet(set) => Some(set),
            Self::Composite(_) => None,
        }
    }

    /// Mutable access to the composite
    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeDataSet> {
        match self {
            Self::PointSet(_) => None,
            Self::Composite(composite) => Some(composite),
        }
    }
}

impl From<PointSet> for DataObject {
    fn from(set: PointSet) -> Self {
        Self::PointSet(set)
    }
}

impl From<CompositeDataSet> for DataObject {
    fn from(composite: CompositeDataSet) -> Self {
        Self::Composite(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> PointSet {
        PointSet::new((0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect())
    }

    #[test]
    fn test_point_ids_default_to_index() {
        let mut set = line(3);
        assert_eq!(set.point_id(2), Some(2));
        assert_eq!(set.point_id(3), None);

        set.set_point_ids(vec![10, 11, 12]).unwrap();
        assert_eq!(set.point_id(1), Some(11));
        assert_eq!(
            set.set_point_ids(vec![1]),
            Err(DataError::IdCountMismatch { ids: 1, points: 3 })
        );
    }

    #[test]
    fn test_mutators_bump_stamp() {
        let mut set = line(2);
        let before = set.modified_time();
        set.set_attribute(AttributeKind::Scalars, DataArray::new(1, vec![1.0_f64, 2.0]).unwrap());
        let after_attribute = set.modified_time();
        assert!(after_attribute > before);

        set.add_field_array(DataArray::named("temp", 1, vec![20.0_f64, 21.0]).unwrap());
        assert!(set.modified_time() > after_attribute);

        let stamp = set.modified_time();
        assert!(set.remove_attribute(AttributeKind::Normals).is_none());
        assert_eq!(set.modified_time(), stamp);
    }

    #[test]
    fn test_set_points_drops_mismatched_ids() {
        let mut set = line(2);
        set.set_point_ids(vec![5, 6]).unwrap();
        set.set_points(vec![Point3::origin()]);
        assert!(set.point_ids().is_none());
        assert_eq!(set.point_id(0), Some(0));
    }

    #[test]
    fn test_field_and_point_array_lookup() {
        let mut set = line(2);
        set.add_field_array(DataArray::named("a", 1, vec![1_i32, 2]).unwrap());
        set.add_field_array(DataArray::named("b", 1, vec![3_i32, 4]).unwrap());
        set.add_point_array(DataArray::named("type", 1, vec![0_i32, 1]).unwrap());
        set.set_attribute(
            AttributeKind::Vectors,
            DataArray::named("velocity", 3, vec![0.0_f64; 6]).unwrap(),
        );

        assert_eq!(set.field_data().len(), 2);
        assert_eq!(set.field_data().array_by_name("b").unwrap().value(0, 0), set.field_data().array(1).unwrap().value(0, 0));
        assert!(set.field_data().array_by_name("c").is_none());
        assert!(set.point_data().array("type").is_some());
        assert!(set.point_data().array("velocity").is_some());
        assert_eq!(set.point_data().number_of_arrays(), 1);
    }

    #[test]
    fn test_composite_stamp_tracks_blocks() {
        let mut composite = CompositeDataSet::new();
        composite.add_block(line(1));
        composite.add_block(line(2));
        let before = composite.modified_time();

        composite.block_mut(1).unwrap().modified();
        assert!(composite.modified_time() > before);

        let object = DataObject::from(composite);
        assert_eq!(object.blocks().len(), 2);
        assert_eq!(object.number_of_points(), 3);
        assert!(object.as_point_set().is_none());
    }
}
