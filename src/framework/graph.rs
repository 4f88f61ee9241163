//! # Dependency Resolution
//!
//! Kahn's algorithm over a read-only snapshot of the registry.
//!
//! Only resources with an initializer are scheduled. Edges pointing at a
//! resource without an initializer (value-only, or never registered) and
//! self-edges are dropped before in-degrees are counted. Whatever never
//! reaches in-degree zero is reported as cyclic: the members of a cycle plus
//! everything that transitively waits on one.

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// One resource as seen by the resolver, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub name: String,
    pub dependencies: Vec<String>,
    pub has_initializer: bool,
}

impl GraphNode {
    pub fn new<I, S>(name: impl Into<String>, dependencies: I, has_initializer: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            has_initializer,
        }
    }
}

/// Output of [`DependencyGraph::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOrder {
    /// Topological order of the acyclic part.
    pub order: Vec<String>,
    /// Nodes that never reached in-degree zero, in registration order.
    pub cyclic: Vec<String>,
}

/// Reverse adjacency plus in-degrees for the schedulable resources.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    dependents: HashMap<String, Vec<String>>,
    in_degree: HashMap<String, usize>,
}

impl DependencyGraph {
    pub fn build(snapshot: &[GraphNode]) -> Self {
        let known: HashSet<&str> = snapshot.iter().map(|node| node.name.as_str()).collect();
        let candidates: HashSet<&str> = snapshot
            .iter()
            .filter(|node| node.has_initializer)
            .map(|node| node.name.as_str())
            .collect();

        let mut graph = Self::default();
        for node in snapshot.iter().filter(|node| node.has_initializer) {
            graph.nodes.push(node.name.clone());
            graph.in_degree.entry(node.name.clone()).or_insert(0);
        }

        for node in snapshot.iter().filter(|node| node.has_initializer) {
            let mut seen = HashSet::new();
            for dependency in &node.dependencies {
                if dependency == &node.name {
                    warn!(resource = %node.name, "Dropping self-dependency");
                    continue;
                }
                if !candidates.contains(dependency.as_str()) {
                    if known.contains(dependency.as_str()) {
                        debug!(resource = %node.name, dependency = %dependency, "Dependency has no initializer, treated as satisfied");
                    } else {
                        warn!(resource = %node.name, dependency = %dependency, "Dropping dependency on unregistered resource");
                    }
                    continue;
                }
                if !seen.insert(dependency.as_str()) {
                    continue;
                }
                graph
                    .dependents
                    .entry(dependency.clone())
                    .or_default()
                    .push(node.name.clone());
                *graph.in_degree.entry(node.name.clone()).or_insert(0) += 1;
            }
        }

        graph
    }

    pub fn in_degree(&self, name: &str) -> Option<usize> {
        self.in_degree.get(name).copied()
    }

    pub fn dependents(&self, name: &str) -> &[String] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn resolve(&self) -> ResolvedOrder {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<&String> = self
            .nodes
            .iter()
            .filter(|name| in_degree.get(name.as_str()) == Some(&0))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(name) = queue.pop_front() {
            order.push(name.clone());
            for dependent in self.dependents(name) {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        let cyclic = self
            .nodes
            .iter()
            .filter(|name| in_degree.get(name.as_str()).is_some_and(|degree| *degree > 0))
            .cloned()
            .collect();

        ResolvedOrder { order, cyclic }
    }
}
