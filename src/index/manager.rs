//! Manager for property indices
//!
//! Handles creation of, maintenance of and candidate lookup through the
//! per-field indices.

use super::property_index::PropertyIndex;
use crate::graph::{PropertyMap, Vertex, VertexHandle};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// Manager for all property indices of a graph
#[derive(Debug, Default)]
pub struct IndexManager {
    indices: IndexMap<String, PropertyIndex>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self {
            indices: IndexMap::new(),
        }
    }

    /// Create an empty index for a field; returns false if it already existed
    pub fn create_index(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.indices.contains_key(&field) {
            warn!("Index on field '{}' already exists", field);
            return false;
        }
        debug!("Created index on field '{}'", field);
        self.indices.insert(field, PropertyIndex::new());
        true
    }

    /// Check if an index exists
    pub fn has_index(&self, field: &str) -> bool {
        self.indices.contains_key(field)
    }

    /// Get index for querying
    pub fn get_index(&self, field: &str) -> Option<&PropertyIndex> {
        self.indices.get(field)
    }

    /// Indexed field names in creation order
    pub fn indexed_fields(&self) -> Vec<&str> {
        self.indices.keys().map(String::as_str).collect()
    }

    /// Add a vertex to every index whose field it carries
    pub fn index_vertex(&mut self, vertex: &Vertex) {
        for (field, index) in self.indices.iter_mut() {
            if let Some(value) = vertex.field(field) {
                index.insert(value.as_ref(), vertex.handle());
            }
        }
    }

    /// Populate one index from an existing vertex set
    pub fn backfill<'a, I>(&mut self, field: &str, vertices: I)
    where
        I: IntoIterator<Item = &'a Vertex>,
    {
        if let Some(index) = self.indices.get_mut(field) {
            let mut indexed = 0usize;
            for vertex in vertices {
                if let Some(value) = vertex.field(field) {
                    index.insert(value.as_ref(), vertex.handle());
                    indexed += 1;
                }
            }
            debug!("Backfilled index '{}' with {} vertices", field, indexed);
        }
    }

    /// Narrow a pattern to candidate vertices
    ///
    /// Intersects the postings of every indexed field present in the pattern.
    /// Returns `None` when no field of the pattern can use an index, meaning
    /// the caller has to scan. Candidates still need the exact-match filter.
    pub fn candidates(&self, pattern: &PropertyMap) -> Option<FxHashSet<VertexHandle>> {
        let mut result: Option<FxHashSet<VertexHandle>> = None;

        for (field, value) in pattern {
            let Some(postings) = self.indices.get(field).and_then(|index| index.get(value)) else {
                continue;
            };

            let narrowed = match result {
                None => postings,
                Some(current) => current.intersection(&postings).copied().collect(),
            };
            if narrowed.is_empty() {
                return Some(narrowed);
            }
            result = Some(narrowed);
        }

        result
    }
}
