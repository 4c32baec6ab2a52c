//! In-memory graph storage implementation
//!
//! Vertices and edges live in two arenas addressed by [`VertexHandle`] and
//! [`EdgeId`]. Each vertex keeps the handles of its incoming and outgoing
//! edges, so the vertex -> edge -> vertex cycle never turns into an
//! ownership cycle.

use super::config::GraphConfig;
use super::edge::Edge;
use super::pattern::{matches_pattern, EdgeFilter, VertexPattern};
use super::property::{PropertyMap, PropertyValue};
use super::types::{Direction, EdgeId, Label, VertexHandle, VertexId};
use super::vertex::Vertex;
use crate::index::IndexManager;
use crate::query::Query;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Which end of an edge a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Destination => write!(f, "destination"),
        }
    }
}

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("A vertex with id '{0}' already exists")]
    DuplicateId(VertexId),

    #[error("Invalid edge: {endpoint} vertex '{id}' does not exist")]
    DanglingEndpoint { endpoint: Endpoint, id: VertexId },

    #[error("Vertex '{0}' not found")]
    VertexNotFound(VertexId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Vertex insertion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVertex {
    /// Explicit id; generated when absent
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl NewVertex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Edge insertion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEdge {
    #[serde(default, rename = "_label")]
    pub label: Option<String>,
    pub source: String,
    pub destination: String,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl NewEdge {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            label: None,
            source: source.into(),
            destination: destination.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Summary counters of a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub indexed_fields: Vec<String>,
}

/// In-memory graph storage
///
/// - vertices: VertexHandle -> Vertex (arena, insertion order)
/// - edges: EdgeId -> Edge (arena, insertion order)
/// - id_index: VertexId -> VertexHandle
/// - property_index: secondary indices on configured vertex fields
#[derive(Debug)]
pub struct GraphStore {
    /// Vertex arena
    vertices: Vec<Vertex>,

    /// Edge arena
    edges: Vec<Edge>,

    /// Primary id lookup
    id_index: FxHashMap<VertexId, VertexHandle>,

    /// Property indices manager
    property_index: IndexManager,

    config: GraphConfig,

    /// Next candidate for generated ids
    next_auto_id: u64,
}

impl GraphStore {
    /// Create a new empty graph store with the default configuration
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create a new empty graph store, building the configured indices
    pub fn with_config(config: GraphConfig) -> Self {
        info!(
            "Creating graph store with indexed fields {:?}",
            config.indexed_fields
        );

        let mut property_index = IndexManager::new();
        for field in &config.indexed_fields {
            property_index.create_index(field.clone());
        }

        GraphStore {
            vertices: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            id_index: FxHashMap::default(),
            property_index,
            next_auto_id: config.auto_id_start,
            config,
        }
    }

    /// Build a whole graph, stopping at the first failing insertion
    pub fn from_parts<V, E>(config: GraphConfig, vertices: V, edges: E) -> GraphResult<Self>
    where
        V: IntoIterator<Item = NewVertex>,
        E: IntoIterator<Item = NewEdge>,
    {
        let mut store = Self::with_config(config);
        store.add_vertices(vertices)?;
        store.add_edges(edges)?;
        Ok(store)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Insert a vertex, generating an id when none is given
    pub fn add_vertex(&mut self, properties: PropertyMap, id: Option<&str>) -> GraphResult<VertexHandle> {
        let id = match id {
            Some(id) => {
                if self.id_index.contains_key(id) {
                    return Err(GraphError::DuplicateId(VertexId::new(id)));
                }
                VertexId::new(id)
            }
            None => self.generate_id(),
        };

        let handle = VertexHandle::new(self.vertices.len());
        let vertex = Vertex::new(id.clone(), handle, properties);

        self.property_index.index_vertex(&vertex);
        self.id_index.insert(id, handle);
        self.vertices.push(vertex);

        debug!("Inserted vertex '{}' at {}", self.vertices[handle.index()].id, handle);
        Ok(handle)
    }

    /// Insert a vertex from an insertion request
    pub fn insert_vertex(&mut self, vertex: NewVertex) -> GraphResult<VertexHandle> {
        self.add_vertex(vertex.properties, vertex.id.as_deref())
    }

    /// Insert several vertices, stopping at the first error
    pub fn add_vertices<I>(&mut self, vertices: I) -> GraphResult<Vec<VertexHandle>>
    where
        I: IntoIterator<Item = NewVertex>,
    {
        vertices.into_iter().map(|v| self.insert_vertex(v)).collect()
    }

    /// Insert a directed edge between two existing vertices
    ///
    /// The edge is appended to the source's outgoing list and the
    /// destination's incoming list.
    pub fn add_edge(
        &mut self,
        label: Option<&str>,
        source: &str,
        destination: &str,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        let source_handle = self.handle_of(source).ok_or_else(|| GraphError::DanglingEndpoint {
            endpoint: Endpoint::Source,
            id: VertexId::new(source),
        })?;
        let destination_handle =
            self.handle_of(destination)
                .ok_or_else(|| GraphError::DanglingEndpoint {
                    endpoint: Endpoint::Destination,
                    id: VertexId::new(destination),
                })?;

        let edge_id = EdgeId::new(self.edges.len());
        self.edges.push(Edge::new(
            edge_id,
            label.map(Label::new),
            source_handle,
            destination_handle,
            properties,
        ));

        // Update adjacency lists
        self.vertices[source_handle.index()].outgoing.push(edge_id);
        self.vertices[destination_handle.index()].incoming.push(edge_id);

        debug!("Inserted edge {} from '{}' to '{}'", edge_id, source, destination);
        Ok(edge_id)
    }

    /// Insert an edge from an insertion request
    pub fn insert_edge(&mut self, edge: NewEdge) -> GraphResult<EdgeId> {
        self.add_edge(
            edge.label.as_deref(),
            &edge.source,
            &edge.destination,
            edge.properties,
        )
    }

    /// Insert several edges, stopping at the first error
    pub fn add_edges<I>(&mut self, edges: I) -> GraphResult<Vec<EdgeId>>
    where
        I: IntoIterator<Item = NewEdge>,
    {
        edges.into_iter().map(|e| self.insert_edge(e)).collect()
    }

    /// Add a secondary index after construction, backfilling existing vertices
    pub fn create_index(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if !self.property_index.create_index(field.clone()) {
            return false;
        }
        self.property_index.backfill(&field, &self.vertices);
        self.config.indexed_fields.push(field);
        true
    }

    pub fn has_index(&self, field: &str) -> bool {
        self.property_index.has_index(field)
    }

    /// Look up a vertex by id
    pub fn find_by_id(&self, id: &str) -> Option<&Vertex> {
        self.handle_of(id).and_then(|h| self.vertex(h))
    }

    /// Look up a vertex by id, failing when it does not exist
    pub fn get_vertex(&self, id: &str) -> GraphResult<&Vertex> {
        self.find_by_id(id)
            .ok_or_else(|| GraphError::VertexNotFound(VertexId::new(id)))
    }

    /// Look up several vertices, one slot per requested id, in request order
    pub fn find_by_ids<I, S>(&self, ids: I) -> Vec<Option<&Vertex>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().map(|id| self.find_by_id(id.as_ref())).collect()
    }

    /// Resolve a selector to vertices
    ///
    /// `All` (or an empty id list) returns a snapshot of every vertex in
    /// insertion order. Unknown ids are skipped.
    pub fn find_matching(&self, pattern: &VertexPattern) -> Vec<&Vertex> {
        match pattern {
            VertexPattern::All => self.vertices.iter().collect(),
            VertexPattern::Ids(ids) if ids.is_empty() => self.vertices.iter().collect(),
            VertexPattern::Ids(ids) => self.find_by_ids(ids).into_iter().flatten().collect(),
            VertexPattern::Id(id) => self.find_by_id(id).into_iter().collect(),
            VertexPattern::Properties(fields) => self.search_vertices(fields),
        }
    }

    /// Property-equality search, narrowed by secondary indices where possible
    pub fn search_vertices(&self, pattern: &PropertyMap) -> Vec<&Vertex> {
        let matches = |vertex: &&Vertex| matches_pattern(pattern, |key| vertex.field(key));

        match self.property_index.candidates(pattern) {
            Some(candidates) => {
                let mut handles: Vec<_> = candidates.into_iter().collect();
                handles.sort_unstable();
                handles
                    .into_iter()
                    .filter_map(|h| self.vertex(h))
                    .filter(matches)
                    .collect()
            }
            None => self.vertices.iter().filter(matches).collect(),
        }
    }

    /// Edges of one adjacency list that pass the filter, in insertion order
    pub fn edges(&self, vertex: VertexHandle, direction: Direction, filter: &EdgeFilter) -> Vec<&Edge> {
        let Some(vertex) = self.vertex(vertex) else {
            return Vec::new();
        };
        vertex
            .edge_ids(direction)
            .iter()
            .filter_map(|id| self.edge(*id))
            .filter(|edge| filter.accepts(edge))
            .collect()
    }

    /// Incoming edges of a vertex
    pub fn in_edges(&self, vertex: VertexHandle, filter: &EdgeFilter) -> Vec<&Edge> {
        self.edges(vertex, Direction::In, filter)
    }

    /// Outgoing edges of a vertex
    pub fn out_edges(&self, vertex: VertexHandle, filter: &EdgeFilter) -> Vec<&Edge> {
        self.edges(vertex, Direction::Out, filter)
    }

    pub fn vertex(&self, handle: VertexHandle) -> Option<&Vertex> {
        self.vertices.get(handle.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn handle_of(&self, id: &str) -> Option<VertexHandle> {
        self.id_index.get(id).copied()
    }

    pub fn has_vertex(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All vertices in insertion order
    pub fn all_vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            vertex_count: self.vertex_count(),
            edge_count: self.edge_count(),
            indexed_fields: self
                .property_index
                .indexed_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Start a traversal from the vertices selected by `pattern`
    pub fn v(&self, pattern: impl Into<VertexPattern>) -> Query<'_> {
        Query::new(self).source(pattern)
    }

    fn generate_id(&mut self) -> VertexId {
        loop {
            let candidate = self.next_auto_id.to_string();
            self.next_auto_id += 1;
            if !self.id_index.contains_key(candidate.as_str()) {
                return VertexId::new(candidate);
            }
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::props;

    fn odin_graph() -> GraphStore {
        GraphStore::from_parts(
            GraphConfig::default(),
            vec![
                NewVertex::new().with_id("odin").with_property("hair", "magnificent"),
                NewVertex::new().with_id("thor").with_property("hair", "magnificent"),
                NewVertex::new().with_id("balder").with_property("hair", "middling"),
                NewVertex::new().with_id("hoder").with_property("hair", "y"),
            ],
            vec![
                NewEdge::new("thor", "odin").with_label("childOf").with_property("color", "green"),
                NewEdge::new("balder", "odin").with_label("childOf").with_property("color", "green"),
                NewEdge::new("hoder", "odin").with_label("childOf").with_property("color", "blue"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_add_and_find_vertex() {
        let mut store = GraphStore::new();
        let handle = store.add_vertex(props([("name", "Alice")]), Some("alice")).unwrap();

        assert_eq!(store.vertex_count(), 1);
        let vertex = store.find_by_id("alice").unwrap();
        assert_eq!(vertex.handle(), handle);
        assert_eq!(vertex.get_property("name").unwrap().as_string(), Some("Alice"));
        assert!(store.find_by_id("bob").is_none());
        assert_eq!(
            store.get_vertex("bob").unwrap_err(),
            GraphError::VertexNotFound(VertexId::new("bob"))
        );
    }

    #[test]
    fn test_duplicate_id() {
        let mut store = GraphStore::new();
        store.add_vertex(PropertyMap::new(), Some("odin")).unwrap();

        let result = store.add_vertex(PropertyMap::new(), Some("odin"));
        assert_eq!(result, Err(GraphError::DuplicateId(VertexId::new("odin"))));
        assert_eq!(store.vertex_count(), 1);
    }

    #[test]
    fn test_auto_ids() {
        let mut store = GraphStore::new();
        let a = store.add_vertex(PropertyMap::new(), None).unwrap();
        store.add_vertex(PropertyMap::new(), Some("3")).unwrap();
        let b = store.add_vertex(PropertyMap::new(), None).unwrap();
        let c = store.add_vertex(PropertyMap::new(), None).unwrap();

        assert_eq!(store.vertex(a).unwrap().id(), "1");
        assert_eq!(store.vertex(b).unwrap().id(), "2");
        // "3" was taken explicitly
        assert_eq!(store.vertex(c).unwrap().id(), "4");
    }

    #[test]
    fn test_auto_id_start() {
        let mut store = GraphStore::with_config(GraphConfig::default().with_auto_id_start(100));
        let a = store.add_vertex(PropertyMap::new(), None).unwrap();
        assert_eq!(store.vertex(a).unwrap().id(), "100");
    }

    #[test]
    fn test_dangling_endpoints() {
        let mut store = GraphStore::new();
        store.add_vertex(PropertyMap::new(), Some("a")).unwrap();

        let result = store.add_edge(None, "ghost", "a", PropertyMap::new());
        assert_eq!(
            result,
            Err(GraphError::DanglingEndpoint {
                endpoint: Endpoint::Source,
                id: VertexId::new("ghost"),
            })
        );

        let result = store.add_edge(None, "a", "ghost", PropertyMap::new());
        assert_eq!(
            result,
            Err(GraphError::DanglingEndpoint {
                endpoint: Endpoint::Destination,
                id: VertexId::new("ghost"),
            })
        );
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_double_bookkeeping() {
        let store = odin_graph();
        let odin = store.handle_of("odin").unwrap();
        let thor = store.handle_of("thor").unwrap();

        let incoming = store.in_edges(odin, &EdgeFilter::Any);
        assert_eq!(incoming.len(), 3);
        assert!(store.out_edges(odin, &EdgeFilter::Any).is_empty());

        let outgoing = store.out_edges(thor, &EdgeFilter::Any);
        assert_eq!(outgoing.len(), 1);
        assert!(incoming.contains(&outgoing[0]));
        assert_eq!(outgoing[0].destination, odin);
    }

    #[test]
    fn test_edge_filters() {
        let store = odin_graph();
        let odin = store.handle_of("odin").unwrap();

        assert_eq!(store.in_edges(odin, &EdgeFilter::from("childOf")).len(), 3);
        assert_eq!(store.in_edges(odin, &EdgeFilter::from("banana")).len(), 0);
        assert_eq!(
            store.in_edges(odin, &EdgeFilter::from(props([("color", "green")]))).len(),
            2
        );
    }

    #[test]
    fn test_find_by_ids_preserves_order() {
        let store = odin_graph();
        let found = store.find_by_ids(["hoder", "loki", "thor"]);

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].map(Vertex::id), Some("hoder"));
        assert!(found[1].is_none());
        assert_eq!(found[2].map(Vertex::id), Some("thor"));
    }

    #[test]
    fn test_find_matching() {
        let store = odin_graph();

        assert_eq!(store.find_matching(&VertexPattern::All).len(), 4);
        assert_eq!(store.find_matching(&VertexPattern::Ids(vec![])).len(), 4);
        assert_eq!(store.find_matching(&"thor".into()).len(), 1);
        assert_eq!(store.find_matching(&"loki".into()).len(), 0);
        assert_eq!(store.find_matching(&vec!["thor", "loki", "hoder"].into()).len(), 2);
        assert_eq!(
            store
                .find_matching(&props([("hair", "magnificent")]).into())
                .len(),
            2
        );
    }

    #[test]
    fn test_create_index_backfills() {
        let mut store = odin_graph();
        assert!(!store.has_index("hair"));

        assert!(store.create_index("hair"));
        assert!(!store.create_index("hair"));
        assert!(store.has_index("hair"));

        let found: Vec<_> = store
            .search_vertices(&props([("hair", "magnificent")]))
            .into_iter()
            .map(Vertex::id)
            .collect();
        assert_eq!(found, vec!["odin", "thor"]);
        assert_eq!(store.statistics().indexed_fields, vec!["hair"]);
    }

    #[test]
    fn test_statistics() {
        let store = odin_graph();
        let stats = store.statistics();
        assert_eq!(stats.vertex_count, 4);
        assert_eq!(stats.edge_count, 3);
        assert!(stats.indexed_fields.is_empty());
    }

    #[test]
    fn test_new_vertex_from_json() {
        let vertex: NewVertex =
            serde_json::from_str(r#"{"_id": "odin", "hair": "magnificent"}"#).unwrap();
        assert_eq!(vertex.id.as_deref(), Some("odin"));
        assert_eq!(vertex.properties["hair"].as_string(), Some("magnificent"));

        let edge: NewEdge = serde_json::from_str(
            r#"{"_label": "childOf", "source": "thor", "destination": "odin", "color": "green"}"#,
        )
        .unwrap();
        assert_eq!(edge.label.as_deref(), Some("childOf"));
        assert_eq!(edge.properties["color"].as_string(), Some("green"));
    }
}
