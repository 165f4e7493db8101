//! Label generation pipeline
//!
//! # Architecture
//!
//! ```text
//! LabeledDataMapper (rebuild scheduler)
//!         ├── AttributeSelector   point -> value tuple
//!         ├── FormatResolver      kind  -> compiled template
//!         ├── build_label_into    tuple -> label text
//!         ├── CoordinateMapper    point -> output position
//!         └── LabelPool           pooled text objects
//!                     ↓
//!         render_opaque_geometry / render_overlay
//!                     ↓
//!            LabelRenderBackend
//! ```

mod coordinates;
mod mapper;
mod pool;
mod selector;
mod text;

pub use coordinates::{CoordinateMapper, CoordinateSystem, LabelTransform, SharedTransform};
pub use mapper::{LabelEntry, LabeledDataMapper};
pub use pool::{LabelPool, TextMapper};
pub use selector::{
    AttributeQuery, AttributeSelector, ComponentRangePolicy, FieldDataRef, LabelMode,
};
pub use text::{build_label, build_label_into};

use crate::format::FormatError;
use thiserror::Error;

/// Errors raised by the label pipeline
#[derive(Error, Debug)]
pub enum LabelError {
    /// The pool could not grow to the requested size
    ///
    /// The rebuild is abandoned; the previous label set stays visible and the
    /// next rebuild retries from scratch.
    #[error("label pool exhausted: {requested} labels requested, limit {limit}")]
    PoolExhausted {
        /// Labels the rebuild needed
        requested: usize,
        /// Configured or allocatable limit
        limit: usize,
    },

    /// Memory for the pool could not be reserved
    #[error("failed to reserve memory for {requested} labels: {reason}")]
    AllocationFailed {
        /// Labels the rebuild needed
        requested: usize,
        /// Allocator message
        reason: String,
    },

    /// A label format could not be compiled
    #[error("invalid label format: {0}")]
    Format(#[from] FormatError),
}

/// Result type for label operations
pub type LabelResult<T> = Result<T, LabelError>;
