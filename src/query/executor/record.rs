//! Traversal tokens flowing through the pipe pipeline
//!
//! A token is one execution path's cursor: the vertex it currently sits
//! on, the aliases bound along the way and an optional projected value.

use crate::graph::{PropertyValue, VertexHandle};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Alias name -> previously visited vertex
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    aliases: FxHashMap<String, VertexHandle>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or rebind) an alias
    pub fn bind(&mut self, alias: impl Into<String>, vertex: VertexHandle) {
        self.aliases.insert(alias.into(), vertex);
    }

    pub fn get(&self, alias: &str) -> Option<VertexHandle> {
        self.aliases.get(alias).copied()
    }

    pub fn has(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// A single traversal cursor
///
/// Moving a token shares its binding bag; binding a new alias copies the
/// bag only when another token still holds it.
#[derive(Debug, Clone)]
pub struct Token {
    vertex: VertexHandle,
    bindings: Arc<Bindings>,
    result: Option<PropertyValue>,
}

impl Token {
    /// Fresh token with an empty binding bag
    pub fn new(vertex: VertexHandle) -> Self {
        Self::with_bindings(vertex, Arc::new(Bindings::new()))
    }

    /// Fresh token sharing an existing binding bag
    pub fn with_bindings(vertex: VertexHandle, bindings: Arc<Bindings>) -> Self {
        Self {
            vertex,
            bindings,
            result: None,
        }
    }

    pub fn vertex(&self) -> VertexHandle {
        self.vertex
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Shared handle to the binding bag
    pub fn shared_bindings(&self) -> Arc<Bindings> {
        Arc::clone(&self.bindings)
    }

    pub fn binding(&self, alias: &str) -> Option<VertexHandle> {
        self.bindings.get(alias)
    }

    /// Bind the current vertex under `alias`
    pub fn bind(&mut self, alias: &str) {
        let vertex = self.vertex;
        Arc::make_mut(&mut self.bindings).bind(alias, vertex);
    }

    pub fn result(&self) -> Option<&PropertyValue> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, value: PropertyValue) {
        self.result = Some(value);
    }

    pub fn take_result(&mut self) -> Option<PropertyValue> {
        self.result.take()
    }

    /// New token at `vertex` carrying the same bindings and no result
    pub fn moved_to(&self, vertex: VertexHandle) -> Token {
        Token::with_bindings(vertex, self.shared_bindings())
    }

    /// Whether both tokens point at the same binding bag
    pub fn shares_bindings_with(&self, other: &Token) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }
}
