//! Pipegraph
//!
//! An embedded, in-memory property graph with a pull-based traversal engine.
//!
//! # Architecture
//!
//! - `graph`: arena storage of vertices and edges addressed by handles,
//!   with id lookup and optional secondary indices on vertex fields
//! - `index`: value -> vertex-set indices used to narrow pattern searches
//! - `query`: a fluent builder compiling traversals into a program of pipe
//!   operators, run by a demand-driven scheduler
//!
//! Building the graph and querying it are separate phases: every query
//! borrows the store immutably.
//!
//! ## Example Usage
//!
//! ```rust
//! use pipegraph::graph::{GraphConfig, GraphStore, NewEdge, NewVertex};
//!
//! let store = GraphStore::from_parts(
//!     GraphConfig::default().with_indexed_field("hair"),
//!     vec![
//!         NewVertex::new().with_id("odin").with_property("hair", "magnificent"),
//!         NewVertex::new().with_id("thor").with_property("hair", "magnificent"),
//!         NewVertex::new().with_id("balder").with_property("hair", "middling"),
//!     ],
//!     vec![
//!         NewEdge::new("thor", "odin").with_label("childOf"),
//!         NewEdge::new("balder", "odin").with_label("childOf"),
//!     ],
//! )
//! .unwrap();
//!
//! // Children of odin
//! let children = store.v("odin").r#in("childOf").run().unwrap();
//! assert_eq!(children.len(), 2);
//!
//! // Parents that have at least one child with magnificent hair
//! let mut query = store
//!     .v(())
//!     .having(|q| q.r#in("childOf").filter_json(serde_json::json!({"hair": "magnificent"})));
//! let parents = query.run().unwrap();
//! assert_eq!(parents[0].vertex_id(), Some("odin"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod index;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    Direction, Edge, EdgeFilter, EdgeId, GraphConfig, GraphError, GraphResult, GraphStatistics,
    GraphStore, Label, NewEdge, NewVertex, PropertyMap, PropertyValue, Vertex, VertexHandle,
    VertexId, VertexPattern,
};

pub use query::{ExecutionError, ExecutionResult, Query, QueryOutput, Token, VertexFilter};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
