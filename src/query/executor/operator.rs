//! Pipe operators for query execution (pull/emit/done protocol)
//!
//! Each operator keeps its own mutable state and is driven one step at a
//! time by the scheduler in [`Program::run`](super::Program::run). A step
//! receives the token produced by the previous stage, or nothing when the
//! scheduler is asking the stage for buffered output.

use super::record::{Bindings, Token};
use super::{ExecutionError, ExecutionResult};
use crate::graph::{Direction, EdgeFilter, EdgeId, GraphStore, Vertex, VertexHandle, VertexPattern};
use crate::query::filter::VertexFilter;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Outcome of a single operator step
#[derive(Debug, Clone)]
pub enum StepResult {
    /// One output token for the next stage
    Emit(Token),
    /// The input token was consumed without output
    Discard,
    /// More upstream input is needed
    Pull,
    /// No further output until the operator resets itself
    Done,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Emit(token) => write!(f, "emit({})", token.vertex()),
            StepResult::Discard => write!(f, "discard"),
            StepResult::Pull => write!(f, "pull"),
            StepResult::Done => write!(f, "done"),
        }
    }
}

/// Pipe operator trait - all operators implement this
pub trait Pipe: Send {
    /// Advance the operator by one step
    fn step(&mut self, store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult>;

    /// Short operator name for logging and introspection
    fn name(&self) -> &'static str;
}

/// Type alias for boxed operators
pub type PipeBox = Box<dyn Pipe>;

/// How far a traversal walks from each anchor vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Direct neighbours only
    One,
    /// Everything reachable, breadth first
    Many,
}

fn lookup_vertex(store: &GraphStore, handle: VertexHandle) -> ExecutionResult<&Vertex> {
    store
        .vertex(handle)
        .ok_or_else(|| ExecutionError::UnexpectedState(format!("{} is not in the store", handle)))
}

/// Starting vertices: `g.v(pattern)`
pub struct VertexSource {
    pattern: VertexPattern,
    /// Resolved once, then drained from the back
    candidates: Option<Vec<VertexHandle>>,
}

impl VertexSource {
    pub fn new(pattern: VertexPattern) -> Self {
        Self {
            pattern,
            candidates: None,
        }
    }
}

impl Pipe for VertexSource {
    fn step(&mut self, store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let pattern = &self.pattern;
        let candidates = self.candidates.get_or_insert_with(|| {
            store
                .find_matching(pattern)
                .into_iter()
                .map(Vertex::handle)
                .collect()
        });

        let Some(vertex) = candidates.pop() else {
            return Ok(StepResult::Done);
        };

        let token = match token {
            Some(upstream) => Token::with_bindings(vertex, upstream.shared_bindings()),
            None => Token::new(vertex),
        };
        Ok(StepResult::Emit(token))
    }

    fn name(&self) -> &'static str {
        "vertex"
    }
}

/// Edge traversal: `in`, `out`, `in_any`, `out_any`
pub struct TraverseEdgePipe {
    direction: Direction,
    arity: Arity,
    filter: EdgeFilter,
    /// Pending edges; consumed from the back, new frontiers enter at the front
    edges: VecDeque<EdgeId>,
    /// Token the pending edges were loaded for
    anchor: Option<Token>,
    /// Vertices whose adjacency has already been queued
    expanded: FxHashSet<VertexHandle>,
}

impl TraverseEdgePipe {
    pub fn new(direction: Direction, arity: Arity, filter: EdgeFilter) -> Self {
        Self {
            direction,
            arity,
            filter,
            edges: VecDeque::new(),
            anchor: None,
            expanded: FxHashSet::default(),
        }
    }

    /// Filtered adjacency of a vertex, empty once the vertex was expanded
    fn edges_from(&mut self, store: &GraphStore, vertex: VertexHandle) -> Vec<EdgeId> {
        if !self.expanded.insert(vertex) {
            return Vec::new();
        }
        store
            .edges(vertex, self.direction, &self.filter)
            .into_iter()
            .map(|edge| edge.id)
            .collect()
    }
}

impl Pipe for TraverseEdgePipe {
    fn step(&mut self, store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        if token.is_none() && self.edges.is_empty() {
            return Ok(StepResult::Pull);
        }

        if self.edges.is_empty() {
            let anchor = token.ok_or_else(|| {
                ExecutionError::UnexpectedState(format!(
                    "{} traversal has neither queued edges nor an input token",
                    self.direction
                ))
            })?;
            let loaded = self.edges_from(store, anchor.vertex());
            self.edges.extend(loaded);
            self.anchor = Some(anchor);
        }

        let Some(edge_id) = self.edges.pop_back() else {
            return Ok(StepResult::Pull);
        };

        let edge = store
            .edge(edge_id)
            .ok_or_else(|| ExecutionError::UnexpectedState(format!("{} is not in the store", edge_id)))?;
        let vertex = edge.far_end(self.direction);

        if self.arity == Arity::Many {
            let frontier = self.edges_from(store, vertex);
            for id in frontier.into_iter().rev() {
                self.edges.push_front(id);
            }
        }

        let anchor = self.anchor.as_ref().ok_or_else(|| {
            ExecutionError::UnexpectedState("traversal lost its anchor token".to_string())
        })?;
        Ok(StepResult::Emit(anchor.moved_to(vertex)))
    }

    fn name(&self) -> &'static str {
        match (self.direction, self.arity) {
            (Direction::In, Arity::One) => "in",
            (Direction::Out, Arity::One) => "out",
            (Direction::In, Arity::Many) => "in_any",
            (Direction::Out, Arity::Many) => "out_any",
        }
    }
}

/// Projection: `property(field)`
pub struct PropertyPipe {
    field: String,
}

impl PropertyPipe {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Pipe for PropertyPipe {
    fn step(&mut self, store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let Some(mut token) = token else {
            return Ok(StepResult::Pull);
        };

        let value = lookup_vertex(store, token.vertex())?.field(&self.field);
        match value {
            Some(value) if !value.is_null() => {
                token.set_result(value.into_owned());
                Ok(StepResult::Emit(token))
            }
            _ => Ok(StepResult::Discard),
        }
    }

    fn name(&self) -> &'static str {
        "property"
    }
}

/// Deduplication by vertex: `unique()`
#[derive(Default)]
pub struct UniquePipe {
    seen: FxHashSet<VertexHandle>,
}

impl UniquePipe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pipe for UniquePipe {
    fn step(&mut self, _store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let Some(token) = token else {
            return Ok(StepResult::Pull);
        };
        if !self.seen.insert(token.vertex()) {
            return Ok(StepResult::Pull);
        }
        Ok(StepResult::Emit(token))
    }

    fn name(&self) -> &'static str {
        "unique"
    }
}

/// Vertex filter: `filter(pattern | predicate)`
pub struct VertexFilterPipe {
    filter: VertexFilter,
}

impl VertexFilterPipe {
    pub fn new(filter: VertexFilter) -> Self {
        Self { filter }
    }
}

impl Pipe for VertexFilterPipe {
    fn step(&mut self, store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let Some(token) = token else {
            return Ok(StepResult::Pull);
        };
        let vertex = lookup_vertex(store, token.vertex())?;
        if self.filter.matches(vertex, &token) {
            Ok(StepResult::Emit(token))
        } else {
            Ok(StepResult::Pull)
        }
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}

/// Limit per run: `take(n)`
///
/// Reaching the limit resets the counter, so the next run of the same
/// program yields up to `limit` further tokens.
pub struct TakePipe {
    limit: usize,
    taken: usize,
}

impl TakePipe {
    pub fn new(limit: usize) -> Self {
        Self { limit, taken: 0 }
    }
}

impl Pipe for TakePipe {
    fn step(&mut self, _store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        if self.taken >= self.limit {
            self.taken = 0;
            return Ok(StepResult::Done);
        }
        let Some(token) = token else {
            return Ok(StepResult::Pull);
        };
        self.taken += 1;
        Ok(StepResult::Emit(token))
    }

    fn name(&self) -> &'static str {
        "take"
    }
}

/// Alias binding: `as(name)`
pub struct AliasPipe {
    alias: String,
}

impl AliasPipe {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

impl Pipe for AliasPipe {
    fn step(&mut self, _store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let Some(mut token) = token else {
            return Ok(StepResult::Pull);
        };
        token.bind(&self.alias);
        Ok(StepResult::Emit(token))
    }

    fn name(&self) -> &'static str {
        "as"
    }
}

/// Fan-out of bound aliases: `merge(names)`
pub struct MergePipe {
    aliases: Vec<String>,
    /// Vertices still to emit for the current input token
    pending: Option<VecDeque<VertexHandle>>,
    /// Binding bag of the token that filled `pending`
    origin: Option<Arc<Bindings>>,
}

impl MergePipe {
    pub fn new(aliases: Vec<String>) -> Self {
        Self {
            aliases,
            pending: None,
            origin: None,
        }
    }
}

impl Pipe for MergePipe {
    fn step(&mut self, _store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        if self.pending.is_none() && token.is_none() {
            return Ok(StepResult::Pull);
        }

        if self.pending.as_ref().map_or(true, VecDeque::is_empty) {
            let resolved: VecDeque<VertexHandle> = match &token {
                Some(token) => self
                    .aliases
                    .iter()
                    .filter_map(|alias| token.binding(alias))
                    .collect(),
                None => VecDeque::new(),
            };
            self.origin = token.map(|t| t.shared_bindings());
            self.pending = Some(resolved);
        }

        let Some(vertex) = self.pending.as_mut().and_then(VecDeque::pop_front) else {
            return Ok(StepResult::Pull);
        };

        let token = match &self.origin {
            Some(bindings) => Token::with_bindings(vertex, Arc::clone(bindings)),
            None => Token::new(vertex),
        };
        Ok(StepResult::Emit(token))
    }

    fn name(&self) -> &'static str {
        "merge"
    }
}

/// Exclusion of a bound vertex: `except(name)`
pub struct ExceptPipe {
    alias: String,
}

impl ExceptPipe {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

impl Pipe for ExceptPipe {
    fn step(&mut self, _store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let Some(token) = token else {
            return Ok(StepResult::Pull);
        };
        let bound = token
            .binding(&self.alias)
            .ok_or_else(|| ExecutionError::UndefinedAlias(self.alias.clone()))?;
        if token.vertex() == bound {
            return Ok(StepResult::Pull);
        }
        Ok(StepResult::Emit(token))
    }

    fn name(&self) -> &'static str {
        "except"
    }
}

/// Jump to a bound vertex: `back(name)`
pub struct BackPipe {
    alias: String,
}

impl BackPipe {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

impl Pipe for BackPipe {
    fn step(&mut self, _store: &GraphStore, token: Option<Token>) -> ExecutionResult<StepResult> {
        let Some(token) = token else {
            return Ok(StepResult::Pull);
        };
        let target = token
            .binding(&self.alias)
            .ok_or_else(|| ExecutionError::UndefinedAlias(self.alias.clone()))?;
        Ok(StepResult::Emit(token.moved_to(target)))
    }

    fn name(&self) -> &'static str {
        "back"
    }
}
