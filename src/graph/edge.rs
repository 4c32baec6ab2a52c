//! Edge implementation for the property graph
//!
//! Edges are directed, optionally labeled and carry their own properties.
//! Endpoints are arena handles, so an edge never owns the vertices it joins.

use super::property::{PropertyMap, PropertyValue, LABEL_FIELD};
use super::types::{Direction, EdgeId, Label, VertexHandle};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A directed edge in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Arena slot of this edge
    pub id: EdgeId,

    /// Optional relationship label (e.g., "childOf")
    pub label: Option<Label>,

    /// Source vertex (edge goes FROM this vertex)
    pub source: VertexHandle,

    /// Destination vertex (edge goes TO this vertex)
    pub destination: VertexHandle,

    /// Properties associated with this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(
        id: EdgeId,
        label: Option<Label>,
        source: VertexHandle,
        destination: VertexHandle,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            id,
            label,
            source,
            destination,
            properties,
        }
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Resolve a field for pattern matching; `_label` maps to the label
    pub fn field(&self, key: &str) -> Option<Cow<'_, PropertyValue>> {
        if key == LABEL_FIELD {
            return self
                .label
                .as_ref()
                .map(|l| Cow::Owned(PropertyValue::String(l.as_str().to_string())));
        }
        self.properties.get(key).map(Cow::Borrowed)
    }

    /// The endpoint a traversal lands on when it walks this edge from the
    /// given adjacency list
    pub fn far_end(&self, direction: Direction) -> VertexHandle {
        match direction {
            Direction::Out => self.destination,
            Direction::In => self.source,
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::props;

    fn child_of() -> Edge {
        Edge::new(
            EdgeId::new(1),
            Some("childOf".into()),
            VertexHandle::new(10),
            VertexHandle::new(20),
            props([("color", "green")]),
        )
    }

    #[test]
    fn test_create_edge() {
        let edge = child_of();
        assert_eq!(edge.id, EdgeId::new(1));
        assert_eq!(edge.source, VertexHandle::new(10));
        assert_eq!(edge.destination, VertexHandle::new(20));
        assert_eq!(edge.label().map(Label::as_str), Some("childOf"));
    }

    #[test]
    fn test_far_end() {
        let edge = child_of();
        assert_eq!(edge.far_end(Direction::Out), VertexHandle::new(20));
        assert_eq!(edge.far_end(Direction::In), VertexHandle::new(10));
    }

    #[test]
    fn test_field_lookup() {
        let edge = child_of();
        assert_eq!(
            edge.field("_label").map(Cow::into_owned),
            Some(PropertyValue::from("childOf"))
        );
        assert_eq!(
            edge.field("color").map(Cow::into_owned),
            Some(PropertyValue::from("green"))
        );
        assert!(edge.field("weight").is_none());

        let unlabeled = Edge::new(
            EdgeId::new(2),
            None,
            VertexHandle::new(0),
            VertexHandle::new(0),
            PropertyMap::new(),
        );
        assert!(unlabeled.field("_label").is_none());
    }

    #[test]
    fn test_edge_identity() {
        let a = child_of();
        let mut b = child_of();
        b.properties.insert("color".to_string(), "blue".into());
        assert_eq!(a, b);
    }
}
