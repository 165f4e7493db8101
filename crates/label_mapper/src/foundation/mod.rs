//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and display-space matrices
//! - Handle collections for pooled text objects
//! - Modification stamps for cache invalidation
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
