//! Point datasets and their attribute arrays
//!
//! - [`DataArray`]: typed, multi-component value array
//! - [`PointSet`]: points plus point attributes and field data
//! - [`DataObject`]: the mapper input, a single point set or a composite of blocks

mod array;
mod dataset;

pub use array::{ArrayValues, DataArray, LabelValue, ScalarKind};
pub use dataset::{
    AttributeKind, CompositeDataSet, DataObject, FieldData, PointData, PointSet, SharedData,
};

use thiserror::Error;

/// Errors raised while assembling datasets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// An array was declared with zero components per tuple
    #[error("array '{0}' must have at least one component")]
    ZeroComponents(String),

    /// The value count is not a whole number of tuples
    #[error("array '{name}' has {len} values, not a multiple of {components} components")]
    RaggedArray {
        /// Array name, or `<unnamed>`
        name: String,
        /// Number of values supplied
        len: usize,
        /// Components per tuple
        components: usize,
    },

    /// An id array does not match the point count
    #[error("point id array has {ids} entries for {points} points")]
    IdCountMismatch {
        /// Ids supplied
        ids: usize,
        /// Points in the set
        points: usize,
    },
}

/// Result type for dataset assembly
pub type DataResult<T> = Result<T, DataError>;
