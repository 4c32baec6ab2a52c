//! Core type definitions for the graph store

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-visible vertex identifier, unique within a graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexId(String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        VertexId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        VertexId(s)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        VertexId(s.to_string())
    }
}

/// Arena slot of a vertex inside a [`GraphStore`](super::GraphStore)
///
/// Handles are assigned in insertion order and never reused, so ordering
/// handles recovers insertion order. A handle and a [`VertexId`] identify
/// the same vertex one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexHandle(pub usize);

impl VertexHandle {
    pub fn new(slot: usize) -> Self {
        VertexHandle(slot)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexHandle({})", self.0)
    }
}

/// Arena slot of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn new(slot: usize) -> Self {
        EdgeId(slot)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// Edge label (e.g., "childOf", "knows")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

/// Which adjacency list of a vertex a traversal walks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Edges arriving at the vertex; traversal lands on their source
    In,
    /// Edges leaving the vertex; traversal lands on their destination
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}
