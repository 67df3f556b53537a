//! Collection aliases shared across the crate.
//!
//! Hash maps use the Fx hasher from `rustc-hash`; ordered maps are
//! `indexmap` maps keyed with the same hasher so iteration follows
//! declaration order.

pub use rustc_hash::{FxHashMap, FxHashSet};

pub type IndexMap<K, V> =
    indexmap::IndexMap<K, V, core::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

/// Create an empty IndexMap
#[inline]
pub fn index_map_new<K, V>() -> IndexMap<K, V> {
    IndexMap::with_hasher(Default::default())
}
