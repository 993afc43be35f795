// SPDX-License-Identifier: MIT

//! Graph construction and validation

use super::executor::{CompiledGraph, Edge, Router};
use super::{GraphState, Node, END};
use crate::adk::error::WorkflowError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Builder for a [`CompiledGraph`]
pub struct StateGraph<S: GraphState> {
    nodes: Vec<(String, Arc<dyn Node<S>>)>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    /// First construction error, reported by `compile()`
    error: Option<WorkflowError>,
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: HashMap::new(),
            entry: None,
            error: None,
        }
    }

    pub fn add_node(&mut self, name: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let name = name.into();
        if name == END || self.has_node(&name) {
            self.fail(WorkflowError::DuplicateNode(name));
        } else {
            self.nodes.push((name, node));
        }
        self
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.insert_edge(from.into(), Edge::Direct(to.into()))
    }

    /// Route out of `from` by calling `router` on the state; the returned
    /// key is looked up in `branches` to find the next node.
    pub fn add_conditional_edges<F, R, K, V>(
        &mut self,
        from: impl Into<String>,
        router: F,
        branches: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        F: Fn(&S) -> R + Send + Sync + 'static,
        R: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        let router: Router<S> = Arc::new(move |state: &S| router(state).into());
        let branches = branches
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.insert_edge(from.into(), Edge::Conditional { router, branches })
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    /// Mark `name` as terminal (an edge to [`END`])
    pub fn set_finish_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_edge(name, END)
    }

    /// Validate the graph and freeze it for execution
    pub fn compile(mut self) -> Result<CompiledGraph<S>, WorkflowError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let entry = self.entry.clone().ok_or(WorkflowError::MissingEntryPoint)?;
        if !self.has_node(&entry) {
            return Err(WorkflowError::UnknownNode(entry));
        }

        for (name, _) in &self.nodes {
            let edge = self
                .edges
                .get(name)
                .ok_or_else(|| WorkflowError::DanglingNode(name.clone()))?;
            for target in edge.targets() {
                if target != END && !self.has_node(target) {
                    return Err(WorkflowError::UnknownNode(target.to_string()));
                }
            }
        }

        if let Some(source) = self.edges.keys().find(|k| !self.has_node(k)) {
            return Err(WorkflowError::UnknownNode(source.clone()));
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(WorkflowError::CircularDependency(cycle));
        }

        let order: Vec<String> = self.nodes.iter().map(|(n, _)| n.clone()).collect();
        log::debug!("Compiled graph with nodes {:?}, entry {}", order, entry);

        Ok(CompiledGraph::new(
            self.nodes.into_iter().collect(),
            self.edges,
            entry,
        ))
    }

    fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|(n, _)| n == name)
    }

    fn insert_edge(&mut self, from: String, edge: Edge<S>) -> &mut Self {
        if self.edges.contains_key(&from) {
            self.fail(WorkflowError::DuplicateEdge(from));
        } else {
            self.edges.insert(from, edge);
        }
        self
    }

    fn fail(&mut self, err: WorkflowError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Depth-first search for a cycle; returns the node path that closes it
    fn find_cycle(&self) -> Option<Vec<String>> {
        fn visit<S: GraphState>(
            graph: &StateGraph<S>,
            node: &str,
            stack: &mut Vec<String>,
            done: &mut HashSet<String>,
        ) -> Option<Vec<String>> {
            if let Some(pos) = stack.iter().position(|n| n == node) {
                let mut cycle = stack[pos..].to_vec();
                cycle.push(node.to_string());
                return Some(cycle);
            }
            if node == END || done.contains(node) {
                return None;
            }

            stack.push(node.to_string());
            if let Some(edge) = graph.edges.get(node) {
                for target in edge.targets() {
                    if let Some(cycle) = visit(graph, target, stack, done) {
                        return Some(cycle);
                    }
                }
            }
            stack.pop();
            done.insert(node.to_string());
            None
        }

        let mut done = HashSet::new();
        for (name, _) in &self.nodes {
            let mut stack = Vec::new();
            if let Some(cycle) = visit(self, name, &mut stack, &mut done) {
                return Some(cycle);
            }
        }
        None
    }
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}
