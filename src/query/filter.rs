//! Vertex predicates used by `filter`

use crate::graph::{matches_pattern, property_map_from_json, PropertyMap, Vertex};
use crate::query::executor::{ExecutionError, ExecutionResult, Token};
use std::fmt;

/// Caller-supplied test over a vertex and the token sitting on it
pub type VertexPredicate = Box<dyn Fn(&Vertex, &Token) -> bool + Send + Sync>;

/// Keeps or drops tokens in a `filter` step
pub enum VertexFilter {
    /// Every field must equal the given value (`_id` included)
    Pattern(PropertyMap),
    /// Arbitrary predicate
    Predicate(VertexPredicate),
}

impl VertexFilter {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Vertex, &Token) -> bool + Send + Sync + 'static,
    {
        VertexFilter::Predicate(Box::new(f))
    }

    /// Interpret a JSON value as a filter; only objects are patterns
    pub fn from_json(value: serde_json::Value) -> ExecutionResult<Self> {
        let shown = value.to_string();
        property_map_from_json(value)
            .map(VertexFilter::Pattern)
            .ok_or_else(|| {
                ExecutionError::InvalidFilter(format!("expected an object pattern, got {}", shown))
            })
    }

    pub fn matches(&self, vertex: &Vertex, token: &Token) -> bool {
        match self {
            VertexFilter::Pattern(pattern) => matches_pattern(pattern, |key| vertex.field(key)),
            VertexFilter::Predicate(predicate) => predicate(vertex, token),
        }
    }
}

impl fmt::Debug for VertexFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexFilter::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            VertexFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<PropertyMap> for VertexFilter {
    fn from(pattern: PropertyMap) -> Self {
        VertexFilter::Pattern(pattern)
    }
}
