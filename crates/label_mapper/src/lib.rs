//! # Label Mapper
//!
//! Formatted text labels for point datasets.
//!
//! ## Features
//!
//! - **Label Modes**: Point ids, any point attribute, or a field data column
//! - **printf Formats**: C-compatible templates with per-kind defaults
//! - **Cached Rebuilds**: Labels are rebuilt only when the input, the
//!   configuration, or the transform changed
//! - **Pooled Text Objects**: Stable text objects reused across rebuilds
//! - **Backend Agnostic**: Drawing goes through [`render::LabelRenderBackend`]
//!
//! ## Quick Start
//!
//! ```rust
//! use label_mapper::prelude::*;
//!
//! let mut points = PointSet::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 0.0)]);
//! points.set_attribute(AttributeKind::Vectors, DataArray::new(3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])?);
//!
//! let mut mapper = LabeledDataMapper::new();
//! mapper.set_input(Some(DataObject::from(points).into_shared()));
//! mapper.set_label_mode(LabelMode::Vectors);
//! mapper.set_labeled_component(Some(1));
//! mapper.set_label_format(Some("%6.2f"))?;
//! mapper.build_labels()?;
//!
//! let texts: Vec<_> = mapper.labels().map(|label| label.text).collect();
//! assert_eq!(texts, ["  2.00", "  5.00"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod data;
pub mod format;
pub mod foundation;
pub mod labels;
pub mod render;

#[cfg(test)]
mod tests;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, MapperSettings},
        data::{AttributeKind, CompositeDataSet, DataArray, DataObject, PointSet, SharedData},
        format::{FormatError, LabelFormat},
        foundation::math::{Mat4, Mat4Ext, Point3, Vec3},
        labels::{
            ComponentRangePolicy, CoordinateSystem, FieldDataRef, LabelEntry, LabelError, LabelMode,
            LabelTransform, LabeledDataMapper,
        },
        render::{LabelRenderBackend, RenderPass, TextProperty, TextResourceId, Viewport},
    };
}
