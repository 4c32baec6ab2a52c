//! Hash based property index for equality lookups

use crate::graph::{PropertyValue, VertexHandle};
use rustc_hash::{FxHashMap, FxHashSet};

/// Hashable projection of the scalar property values an index can hold
///
/// Arrays, maps, null and NaN have no key; patterns on such values fall
/// back to the exact-match scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    String(String),
    Integer(i64),
    Float(u64),
    Boolean(bool),
}

impl IndexKey {
    pub fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::String(s) => Some(IndexKey::String(s.clone())),
            PropertyValue::Integer(i) => Some(IndexKey::Integer(*i)),
            PropertyValue::Boolean(b) => Some(IndexKey::Boolean(*b)),
            PropertyValue::Float(f) if f.is_nan() => None,
            // -0.0 == 0.0, so both share a key
            PropertyValue::Float(f) if *f == 0.0 => Some(IndexKey::Float(0.0f64.to_bits())),
            PropertyValue::Float(f) => Some(IndexKey::Float(f.to_bits())),
            PropertyValue::Array(_) | PropertyValue::Map(_) | PropertyValue::Null => None,
        }
    }
}

/// Index for a single vertex field
#[derive(Debug, Clone, Default)]
pub struct PropertyIndex {
    /// Value -> Set of vertex handles
    index: FxHashMap<IndexKey, FxHashSet<VertexHandle>>,
}

impl PropertyIndex {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
        }
    }

    /// Record that `vertex` holds `value`; unindexable values are ignored
    pub fn insert(&mut self, value: &PropertyValue, vertex: VertexHandle) {
        if let Some(key) = IndexKey::from_value(value) {
            self.index.entry(key).or_default().insert(vertex);
        }
    }

    /// Vertices holding `value`; `None` when the value has no index key
    pub fn get(&self, value: &PropertyValue) -> Option<FxHashSet<VertexHandle>> {
        let key = IndexKey::from_value(value)?;
        Some(self.index.get(&key).cloned().unwrap_or_default())
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
