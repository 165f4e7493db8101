//! Typed multi-component data arrays

use super::{DataError, DataResult};
use serde::{Deserialize, Serialize};

/// Numeric kind of the values stored in an array
///
/// The kind drives the default label format when no explicit format is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 16-bit integer
    UInt16,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// Point or cell identifier
    IdType,
    /// Single precision float
    Float32,
    /// Double precision float
    Float64,
    /// Single characters
    Char,
    /// Text values
    String,
}

impl ScalarKind {
    /// Whether values of this kind are integers
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64 | Self::Char | Self::String)
    }

    /// Whether values of this kind are floating point
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// Backing storage of a [`DataArray`]
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    /// `i8` values
    Int8(Vec<i8>),
    /// `u8` values
    UInt8(Vec<u8>),
    /// `i16` values
    Int16(Vec<i16>),
    /// `u16` values
    UInt16(Vec<u16>),
    /// `i32` values
    Int32(Vec<i32>),
    /// `u32` values
    UInt32(Vec<u32>),
    /// `i64` values
    Int64(Vec<i64>),
    /// `u64` values
    UInt64(Vec<u64>),
    /// Identifier values
    Id(Vec<i64>),
    /// `f32` values
    Float32(Vec<f32>),
    /// `f64` values
    Float64(Vec<f64>),
    /// Character values
    Char(Vec<char>),
    /// Text values
    Text(Vec<String>),
}

macro_rules! impl_from_vec {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for ArrayValues {
                fn from(values: Vec<$ty>) -> Self {
                    Self::$variant(values)
                }
            }
        )*
    };
}

impl_from_vec!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    char => Char,
    String => Text,
);

impl From<Vec<&str>> for ArrayValues {
    fn from(values: Vec<&str>) -> Self {
        Self::Text(values.into_iter().map(str::to_owned).collect())
    }
}

impl ArrayValues {
    /// Total number of stored values
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Int64(v) | Self::Id(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Whether no values are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of the stored values
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Int8(_) => ScalarKind::Int8,
            Self::UInt8(_) => ScalarKind::UInt8,
            Self::Int16(_) => ScalarKind::Int16,
            Self::UInt16(_) => ScalarKind::UInt16,
            Self::Int32(_) => ScalarKind::Int32,
            Self::UInt32(_) => ScalarKind::UInt32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::UInt64(_) => ScalarKind::UInt64,
            Self::Id(_) => ScalarKind::IdType,
            Self::Float32(_) => ScalarKind::Float32,
            Self::Float64(_) => ScalarKind::Float64,
            Self::Char(_) => ScalarKind::Char,
            Self::Text(_) => ScalarKind::String,
        }
    }

    /// Value at a flat index
    pub fn get(&self, index: usize) -> Option<LabelValue<'_>> {
        Some(match self {
            Self::Int8(v) => LabelValue::Int(i64::from(*v.get(index)?)),
            Self::UInt8(v) => LabelValue::UInt(u64::from(*v.get(index)?)),
            Self::Int16(v) => LabelValue::Int(i64::from(*v.get(index)?)),
            Self::UInt16(v) => LabelValue::UInt(u64::from(*v.get(index)?)),
            Self::Int32(v) => LabelValue::Int(i64::from(*v.get(index)?)),
            Self::UInt32(v) => LabelValue::UInt(u64::from(*v.get(index)?)),
            Self::Int64(v) | Self::Id(v) => LabelValue::Int(*v.get(index)?),
            Self::UInt64(v) => LabelValue::UInt(*v.get(index)?),
            Self::Float32(v) => LabelValue::Float(f64::from(*v.get(index)?)),
            Self::Float64(v) => LabelValue::Float(*v.get(index)?),
            Self::Char(v) => LabelValue::UInt(u64::from(u32::from(*v.get(index)?))),
            Self::Text(v) => LabelValue::Text(v.get(index)?.as_str()),
        })
    }
}

/// One value handed to the label formatter
///
/// Text borrows from the array it was read from, so selecting a tuple never
/// allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelValue<'a> {
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
    /// Text
    Text(&'a str),
}

/// Named array of fixed-size tuples
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: Option<String>,
    components: usize,
    values: ArrayValues,
}

impl DataArray {
    /// Create an unnamed array
    pub fn new(components: usize, values: impl Into<ArrayValues>) -> DataResult<Self> {
        Self::build(None, components, values.into())
    }

    /// Create a named array
    pub fn named(
        name: impl Into<String>,
        components: usize,
        values: impl Into<ArrayValues>,
    ) -> DataResult<Self> {
        Self::build(Some(name.into()), components, values.into())
    }

    fn build(name: Option<String>, components: usize, values: ArrayValues) -> DataResult<Self> {
        let label = || name.clone().unwrap_or_else(|| "<unnamed>".to_string());
        if components == 0 {
            return Err(DataError::ZeroComponents(label()));
        }
        if values.len() % components != 0 {
            return Err(DataError::RaggedArray {
                name: label(),
                len: values.len(),
                components,
            });
        }
        Ok(Self { name, components, values })
    }

    /// Array name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Components per tuple
    pub const fn components(&self) -> usize {
        self.components
    }

    /// Kind of the stored values
    pub const fn kind(&self) -> ScalarKind {
        self.values.kind()
    }

    /// Number of tuples
    pub fn tuple_count(&self) -> usize {
        self.values.len() / self.components
    }

    /// Raw storage
    pub const fn values(&self) -> &ArrayValues {
        &self.values
    }

    /// One component of one tuple
    pub fn value(&self, tuple: usize, component: usize) -> Option<LabelValue<'_>> {
        if component >= self.components {
            return None;
        }
        self.values.get(tuple * self.components + component)
    }

    /// Append every component of `tuple` to `out`
    ///
    /// Returns `false` and leaves `out` untouched when the tuple does not exist.
    pub fn tuple_into<'a>(&'a self, tuple: usize, out: &mut Vec<LabelValue<'a>>) -> bool {
        if tuple >= self.tuple_count() {
            return false;
        }
        let base = tuple * self.components;
        out.extend((base..base + self.components).filter_map(|i| self.values.get(i)));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_access_walks_components_in_order() {
        let array = DataArray::named("vel", 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(array.tuple_count(), 2);
        assert_eq!(array.value(1, 2), Some(LabelValue::Float(6.0)));
        assert_eq!(array.value(1, 3), None);

        let mut out = Vec::new();
        assert!(array.tuple_into(0, &mut out));
        assert_eq!(out, vec![LabelValue::Float(1.0), LabelValue::Float(2.0), LabelValue::Float(3.0)]);
        assert!(!array.tuple_into(2, &mut out));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_ragged_array_is_rejected() {
        let err = DataArray::named("bad", 3, vec![1_i32, 2]).unwrap_err();
        assert_eq!(
            err,
            DataError::RaggedArray { name: "bad".to_string(), len: 2, components: 3 }
        );
        assert!(matches!(
            DataArray::new(0, vec![1_i32]),
            Err(DataError::ZeroComponents(_))
        ));
    }

    #[test]
    fn test_kinds_follow_storage() {
        assert_eq!(DataArray::new(1, vec![1_u8]).unwrap().kind(), ScalarKind::UInt8);
        assert_eq!(DataArray::new(1, vec![1.5_f32]).unwrap().kind(), ScalarKind::Float32);
        assert_eq!(DataArray::new(1, vec!["a", "b"]).unwrap().kind(), ScalarKind::String);
        assert_eq!(DataArray::new(1, ArrayValues::Id(vec![7])).unwrap().kind(), ScalarKind::IdType);
        assert!(ScalarKind::IdType.is_integer());
        assert!(ScalarKind::Float32.is_floating());
        assert!(!ScalarKind::String.is_integer());
        assert_eq!(DataArray::new(1, vec!['x']).unwrap().kind(), ScalarKind::Char);
    }

    #[test]
    fn test_text_values_are_borrowed() {
        let array = DataArray::named("tag", 1, vec!["north", "south"]).unwrap();
        assert_eq!(array.value(1, 0), Some(LabelValue::Text("south")));
    }
}
