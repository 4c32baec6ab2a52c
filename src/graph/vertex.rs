//! Vertex implementation for the property graph
//!
//! A vertex owns its property bag and the handles of its incoming and
//! outgoing edges. The edges themselves live in the store's edge arena.

use super::property::{PropertyMap, PropertyValue, ID_FIELD};
use super::types::{Direction, EdgeId, VertexHandle, VertexId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A vertex in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Caller-visible identifier
    pub id: VertexId,

    /// Arena slot of this vertex
    pub handle: VertexHandle,

    /// Properties associated with this vertex
    pub properties: PropertyMap,

    /// Edges whose destination is this vertex, in insertion order
    pub(crate) incoming: Vec<EdgeId>,

    /// Edges whose source is this vertex, in insertion order
    pub(crate) outgoing: Vec<EdgeId>,
}

impl Vertex {
    /// Create a vertex with no edges
    pub fn new(id: VertexId, handle: VertexHandle, properties: PropertyMap) -> Self {
        Vertex {
            id,
            handle,
            properties,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn handle(&self) -> VertexHandle {
        self.handle
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Resolve a field for patterns and projections; `_id` maps to the identifier
    pub fn field(&self, key: &str) -> Option<Cow<'_, PropertyValue>> {
        if key == ID_FIELD {
            return Some(Cow::Owned(PropertyValue::String(self.id.as_str().to_string())));
        }
        self.properties.get(key).map(Cow::Borrowed)
    }

    /// Edge handles of one adjacency list
    pub fn edge_ids(&self, direction: Direction) -> &[EdgeId] {
        match direction {
            Direction::In => &self.incoming,
            Direction::Out => &self.outgoing,
        }
    }

    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::props;

    #[test]
    fn test_vertex_fields() {
        let vertex = Vertex::new(
            VertexId::new("odin"),
            VertexHandle::new(0),
            props([("hair", "magnificent")]),
        );

        assert_eq!(vertex.id(), "odin");
        assert_eq!(vertex.handle(), VertexHandle::new(0));
        assert!(vertex.has_property("hair"));
        assert_eq!(
            vertex.field("_id").map(Cow::into_owned),
            Some(PropertyValue::from("odin"))
        );
        assert_eq!(
            vertex.field("hair").map(Cow::into_owned),
            Some(PropertyValue::from("magnificent"))
        );
        assert!(vertex.field("beard").is_none());
    }

    #[test]
    fn test_adjacency_lists() {
        let mut vertex = Vertex::new(VertexId::new("odin"), VertexHandle::new(0), PropertyMap::new());
        vertex.incoming.push(EdgeId::new(1));
        vertex.incoming.push(EdgeId::new(2));
        vertex.outgoing.push(EdgeId::new(3));

        assert_eq!(vertex.edge_ids(Direction::In), &[EdgeId::new(1), EdgeId::new(2)]);
        assert_eq!(vertex.edge_ids(Direction::Out), &[EdgeId::new(3)]);
        assert_eq!(vertex.in_degree(), 2);
        assert_eq!(vertex.out_degree(), 1);
    }

    #[test]
    fn test_vertex_equality() {
        let a = Vertex::new(VertexId::new("x"), VertexHandle::new(0), PropertyMap::new());
        let b = Vertex::new(VertexId::new("x"), VertexHandle::new(5), props([("k", 1i64)]));
        let c = Vertex::new(VertexId::new("y"), VertexHandle::new(0), PropertyMap::new());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
