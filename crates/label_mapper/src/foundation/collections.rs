//! Specialized collection types

pub use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Stable identity of one pooled text object
    ///
    /// Keys carry a generation, so a handle from a torn-down pool never
    /// compares equal to a handle from the pool that replaced it.
    pub struct TextHandle;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;
