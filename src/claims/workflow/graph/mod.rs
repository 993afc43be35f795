// SPDX-License-Identifier: MIT

//! State-graph workflow engine
//!
//! A graph is a set of named nodes over one shared state type. Each node reads
//! the current state and returns a partial update, which is merged into the
//! state before the next node runs. Edges are either direct or conditional
//! (a router picks a branch key from the state). Execution is sequential and
//! the graph must be acyclic.

mod builder;
mod executor;

pub use builder::StateGraph;
pub use executor::{CompiledGraph, Execution};

use crate::adk::error::Result;
use async_trait::async_trait;

/// Virtual node marking the end of a run
pub const END: &str = "__end__";

/// State that nodes read from and merge partial updates into
pub trait GraphState: Clone + Send + Sync + 'static {
    type Update: Send;

    /// Merge `update` into `self`. Keys absent from the update keep their value.
    fn merge(&mut self, update: Self::Update);
}

/// One step of a graph
#[async_trait]
pub trait Node<S: GraphState>: Send + Sync {
    async fn run(&self, state: &S) -> Result<S::Update>;
}
