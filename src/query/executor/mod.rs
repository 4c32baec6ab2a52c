//! Query execution engine
//!
//! A [`Program`] is an ordered list of pipes driven by a demand-driven
//! scheduler: it starts at the last pipe and walks backwards one stage
//! at a time whenever a stage asks for more input.

pub mod operator;
pub mod record;

pub use operator::{
    AliasPipe, Arity, BackPipe, ExceptPipe, MergePipe, Pipe, PipeBox, PropertyPipe, StepResult,
    TakePipe, TraverseEdgePipe, UniquePipe, VertexFilterPipe, VertexSource,
};
pub use record::{Bindings, Token};

use crate::graph::{GraphError, GraphStore};
use thiserror::Error;
use tracing::{debug, trace};

/// Execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// A pipe was asked to advance in a state it cannot be in
    #[error("Unexpected state: {0}")]
    UnexpectedState(String),

    /// A filter argument is neither a pattern nor a predicate
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// An alias was read before any step bound it
    #[error("Undefined alias: {0}")]
    UndefinedAlias(String),

    /// Graph store error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// An ordered, reusable sequence of pipes
///
/// Pipe state survives between runs: sources stay drained and `take`
/// resumes paging where the previous run stopped.
#[derive(Default)]
pub struct Program {
    pipes: Vec<PipeBox>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pipe at the end
    pub fn push(&mut self, pipe: PipeBox) {
        self.pipes.push(pipe);
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Operator names in program order
    pub fn names(&self) -> Vec<&'static str> {
        self.pipes.iter().map(|pipe| pipe.name()).collect()
    }

    /// Drive the program until every stage is exhausted
    ///
    /// `pc` starts at the last stage. A `Pull` moves it one stage back
    /// unless every earlier stage is done; an emitted token moves it
    /// forward, and a token leaving the last stage is collected. `done`
    /// marks the highest stage that can no longer produce output.
    pub fn run(&mut self, store: &GraphStore) -> ExecutionResult<Vec<Token>> {
        let max = self.pipes.len() as isize - 1;
        let mut pc = max;
        let mut done: isize = -1;
        let mut current: Option<Token> = None;
        let mut results = Vec::new();
        let mut steps = 0usize;

        while done < max {
            let pipe = &mut self.pipes[pc as usize];
            let outcome = pipe.step(store, current.take())?;
            steps += 1;
            trace!("step {} {} -> {} (done={})", pc, pipe.name(), outcome, done);

            match outcome {
                StepResult::Pull => {
                    if pc - 1 > done {
                        pc -= 1;
                        continue;
                    }
                    done = pc;
                }
                StepResult::Done => done = pc,
                StepResult::Discard => {}
                StepResult::Emit(token) => current = Some(token),
            }

            pc += 1;
            if pc > max {
                if let Some(token) = current.take() {
                    results.push(token);
                }
                pc -= 1;
            }
        }

        debug!(
            "Program [{}] finished: {} results in {} steps",
            self.names().join(", "),
            results.len(),
            steps
        );
        Ok(results)
    }
}
