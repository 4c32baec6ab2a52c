//! Core graph implementation
//!
//! This module implements the property graph data model with:
//! - Vertices with a unique string id and free-form properties
//! - Directed edges with an optional label and properties
//! - Multiple edges between the same vertices
//! - In-memory arena storage with optional secondary indices

pub mod config;
pub mod edge;
pub mod pattern;
pub mod property;
pub mod store;
pub mod types;
pub mod vertex;

// Re-export main types
pub use config::{ConfigError, GraphConfig};
pub use edge::Edge;
pub use pattern::{matches_pattern, EdgeFilter, VertexPattern};
pub use property::{
    property_map_from_json, props, PropertyMap, PropertyValue, ID_FIELD, LABEL_FIELD,
};
pub use store::{
    Endpoint, GraphError, GraphResult, GraphStatistics, GraphStore, NewEdge, NewVertex,
};
pub use types::{Direction, EdgeId, Label, VertexHandle, VertexId};
pub use vertex::Vertex;
