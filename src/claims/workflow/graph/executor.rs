// SPDX-License-Identifier: MIT

//! Graph workflow executor

use super::{GraphState, Node, END};
use crate::adk::error::{Result, WorkflowError};
use std::collections::HashMap;
use std::sync::Arc;

pub(super) type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Outgoing edge of a node
pub(super) enum Edge<S> {
    Direct(String),
    Conditional {
        router: Router<S>,
        branches: HashMap<String, String>,
    },
}

impl<S> Edge<S> {
    pub(super) fn targets(&self) -> Vec<&str> {
        match self {
            Edge::Direct(to) => vec![to.as_str()],
            Edge::Conditional { branches, .. } => {
                let mut targets: Vec<&str> = branches.values().map(String::as_str).collect();
                targets.sort_unstable();
                targets
            }
        }
    }
}

/// Final state of a run and the nodes it passed through, in order
#[derive(Debug, Clone)]
pub struct Execution<S> {
    pub state: S,
    pub path: Vec<String>,
}

/// A validated, acyclic graph ready to run
pub struct CompiledGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: String,
}

impl<S: GraphState> CompiledGraph<S> {
    pub(super) fn new(
        nodes: HashMap<String, Arc<dyn Node<S>>>,
        edges: HashMap<String, Edge<S>>,
        entry: String,
    ) -> Self {
        Self {
            nodes,
            edges,
            entry,
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry
    }

    /// Run from the entry point to END and return the final state
    pub async fn invoke(&self, state: S) -> Result<S> {
        Ok(self.invoke_with_trace(state).await?.state)
    }

    /// Like [`invoke`](Self::invoke), also reporting the visited path.
    ///
    /// A node error aborts the run; the remaining nodes are not executed.
    pub async fn invoke_with_trace(&self, mut state: S) -> Result<Execution<S>> {
        let mut path = Vec::new();
        let mut current = self.entry.clone();

        while current != END {
            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| WorkflowError::UnknownNode(current.clone()))?;

            log::info!("Executing node: {}", current);
            let update = match node.run(&state).await {
                Ok(update) => update,
                Err(e) => {
                    log::error!("Node {} failed: {}", current, e);
                    return Err(e);
                }
            };
            state.merge(update);
            path.push(current.clone());

            let next = self.next_node(&current, &state)?;
            log::info!("Transitioning from {} to {}", current, next);
            current = next;
        }

        Ok(Execution { state, path })
    }

    fn next_node(&self, from: &str, state: &S) -> Result<String, WorkflowError> {
        match self.edges.get(from) {
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, branches }) => {
                let branch = router(state);
                log::info!("Decision at {}: {}", from, branch);
                branches
                    .get(&branch)
                    .cloned()
                    .ok_or_else(|| WorkflowError::UnknownBranch {
                        node: from.to_string(),
                        branch,
                    })
            }
            None => Err(WorkflowError::DanglingNode(from.to_string())),
        }
    }
}
