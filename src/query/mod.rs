//! Query processing module
//!
//! Fluent traversal builder over a [`GraphStore`]:
//!
//! ```rust
//! use pipegraph::graph::{GraphStore, PropertyMap};
//!
//! let mut store = GraphStore::new();
//! store.add_vertex(PropertyMap::new(), Some("odin")).unwrap();
//! store.add_vertex(PropertyMap::new(), Some("thor")).unwrap();
//! store.add_edge(Some("childOf"), "thor", "odin", PropertyMap::new()).unwrap();
//!
//! let children = store.v("odin").r#in("childOf").property("_id").run().unwrap();
//! assert_eq!(children[0].as_value().and_then(|v| v.as_string()), Some("thor"));
//! ```

pub mod executor;
pub mod filter;

// Re-export main types
pub use executor::{
    Arity, Bindings, ExecutionError, ExecutionResult, Pipe, PipeBox, Program, StepResult, Token,
};
pub use filter::{VertexFilter, VertexPredicate};

use crate::graph::{Direction, EdgeFilter, GraphStore, PropertyValue, Vertex, VertexPattern};
use executor::{
    AliasPipe, BackPipe, ExceptPipe, MergePipe, PropertyPipe, TakePipe, TraverseEdgePipe,
    UniquePipe, VertexFilterPipe, VertexSource,
};
use tracing::debug;

/// One element of a query result
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput<'g> {
    /// The vertex a token ended on
    Vertex(&'g Vertex),
    /// A value projected by `property`
    Value(PropertyValue),
}

impl<'g> QueryOutput<'g> {
    pub fn as_vertex(&self) -> Option<&'g Vertex> {
        match self {
            QueryOutput::Vertex(vertex) => Some(vertex),
            QueryOutput::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&PropertyValue> {
        match self {
            QueryOutput::Value(value) => Some(value),
            QueryOutput::Vertex(_) => None,
        }
    }

    /// Identifier of a vertex output
    pub fn vertex_id(&self) -> Option<&'g str> {
        self.as_vertex().map(Vertex::id)
    }
}

/// Fluent builder and runner of a pipe program
///
/// Chaining never fails; the first construction error is kept and
/// returned by [`Query::run`].
pub struct Query<'g> {
    store: &'g GraphStore,
    program: Program,
    next_alias: usize,
    error: Option<ExecutionError>,
}

impl<'g> Query<'g> {
    /// Empty program over `store`
    pub fn new(store: &'g GraphStore) -> Self {
        Self {
            store,
            program: Program::new(),
            next_alias: 1,
            error: None,
        }
    }

    /// Append an arbitrary pipe
    pub fn add(mut self, pipe: PipeBox) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.program.push(pipe);
        self
    }

    /// Vertices selected by `pattern`
    pub fn source(self, pattern: impl Into<VertexPattern>) -> Self {
        self.add(Box::new(VertexSource::new(pattern.into())))
    }

    /// Follow outgoing edges one step
    pub fn out(self, filter: impl Into<EdgeFilter>) -> Self {
        self.traverse(Direction::Out, Arity::One, filter.into())
    }

    /// Follow incoming edges one step
    pub fn r#in(self, filter: impl Into<EdgeFilter>) -> Self {
        self.traverse(Direction::In, Arity::One, filter.into())
    }

    /// Everything reachable through outgoing edges
    pub fn out_any(self, filter: impl Into<EdgeFilter>) -> Self {
        self.traverse(Direction::Out, Arity::Many, filter.into())
    }

    /// Everything reachable through incoming edges
    pub fn in_any(self, filter: impl Into<EdgeFilter>) -> Self {
        self.traverse(Direction::In, Arity::Many, filter.into())
    }

    fn traverse(self, direction: Direction, arity: Arity, filter: EdgeFilter) -> Self {
        self.add(Box::new(TraverseEdgePipe::new(direction, arity, filter)))
    }

    /// Project a vertex field; tokens without it are dropped
    pub fn property(self, field: impl Into<String>) -> Self {
        self.add(Box::new(PropertyPipe::new(field)))
    }

    /// One token per distinct vertex
    pub fn unique(self) -> Self {
        self.add(Box::new(UniquePipe::new()))
    }

    /// Keep vertices matching a pattern or predicate
    pub fn filter(self, filter: impl Into<VertexFilter>) -> Self {
        self.add(Box::new(VertexFilterPipe::new(filter.into())))
    }

    /// Keep vertices accepted by `predicate`
    pub fn filter_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&Vertex, &Token) -> bool + Send + Sync + 'static,
    {
        self.filter(VertexFilter::predicate(predicate))
    }

    /// Keep vertices matching a JSON object pattern
    pub fn filter_json(mut self, pattern: serde_json::Value) -> Self {
        match VertexFilter::from_json(pattern) {
            Ok(filter) => self.filter(filter),
            Err(err) => {
                self.error.get_or_insert(err);
                self
            }
        }
    }

    /// At most `n` results per run
    pub fn take(self, n: usize) -> Self {
        self.add(Box::new(TakePipe::new(n)))
    }

    /// Bind the current vertex under `alias`
    pub fn r#as(self, alias: impl Into<String>) -> Self {
        self.add(Box::new(AliasPipe::new(alias)))
    }

    /// Emit the vertices bound to `aliases`, in order
    pub fn merge<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases = aliases.into_iter().map(Into::into).collect();
        self.add(Box::new(MergePipe::new(aliases)))
    }

    /// Drop tokens sitting on the vertex bound to `alias`
    pub fn except(self, alias: impl Into<String>) -> Self {
        self.add(Box::new(ExceptPipe::new(alias)))
    }

    /// Return to the vertex bound to `alias`
    pub fn back(self, alias: impl Into<String>) -> Self {
        self.add(Box::new(BackPipe::new(alias)))
    }

    /// Keep each vertex for which `build` finds at least one path
    pub fn having<F>(mut self, build: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let alias = format!("__having{}", self.next_alias);
        self.next_alias += 1;
        build(self.r#as(alias.clone())).back(alias).unique()
    }

    /// Number of pipes in the program
    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Pipe names in program order
    pub fn describe(&self) -> Vec<&'static str> {
        self.program.names()
    }

    /// Execute the program
    ///
    /// Outputs are projected values where a `property` step ran, vertices
    /// otherwise. The program keeps its state, so a second call continues
    /// from where this one stopped.
    pub fn run(&mut self) -> ExecutionResult<Vec<QueryOutput<'g>>> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let store = self.store;
        let tokens = self.program.run(store)?;
        debug!("Query returned {} results", tokens.len());

        tokens
            .into_iter()
            .map(|mut token| match token.take_result() {
                Some(value) => Ok(QueryOutput::Value(value)),
                None => store
                    .vertex(token.vertex())
                    .map(QueryOutput::Vertex)
                    .ok_or_else(|| {
                        ExecutionError::UnexpectedState(format!(
                            "{} is not in the store",
                            token.vertex()
                        ))
                    }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{props, GraphConfig, NewEdge, NewVertex};
    use serde_json::json;

    fn create_test_store() -> GraphStore {
        GraphStore::from_parts(
            GraphConfig::default(),
            vec![
                NewVertex::new().with_id("odin").with_property("hair", "magnificent"),
                NewVertex::new().with_id("thor").with_property("hair", "magnificent"),
            ],
            vec![NewEdge::new("thor", "odin").with_label("childOf")],
        )
        .unwrap()
    }

    #[test]
    fn test_describe() {
        let store = create_test_store();
        let query = store.v(()).r#in("childOf").r#as("x").property("hair").take(2);
        assert_eq!(query.len(), 5);
        assert_eq!(query.describe(), vec!["vertex", "in", "as", "property", "take"]);
        assert!(Query::new(&store).is_empty());
    }

    #[test]
    fn test_having_expands_to_alias_back_unique() {
        let store = create_test_store();
        let query = store.v(()).having(|q| q.r#in("childOf"));
        assert_eq!(query.describe(), vec!["vertex", "as", "in", "back", "unique"]);
    }

    #[test]
    fn test_filter_json_error_surfaces_on_run() {
        let store = create_test_store();
        let mut query = store.v(()).filter_json(json!("hair")).unique();

        // nothing is appended after the error
        assert_eq!(query.len(), 1);
        let err = query.run().unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidFilter(_)));
        assert!(query.run().is_err());
    }

    #[test]
    fn test_outputs() {
        let store = create_test_store();

        let vertices = store.v("thor").out(()).run().unwrap();
        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].vertex_id(), Some("odin"));
        assert!(vertices[0].as_value().is_none());

        let values = store
            .v(())
            .filter(props([("_id", "odin")]))
            .property("hair")
            .run()
            .unwrap();
        assert_eq!(values, vec![QueryOutput::Value("magnificent".into())]);
        assert!(values[0].as_vertex().is_none());
    }

    #[test]
    fn test_filter_fn() {
        let store = create_test_store();
        let found = store
            .v(())
            .filter_fn(|vertex, _| vertex.in_degree() > 0)
            .run()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].vertex_id(), Some("odin"));
    }
}
