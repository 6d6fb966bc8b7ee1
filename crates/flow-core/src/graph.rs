//! Class-level dependency graph.
//!
//! Nodes are qualified class identities, edges point from the depending class
//! (caller, subclass) to the class it depends on (callee, supertype).

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Qualified identity of a class: `(package, simple name)`.
///
/// An empty package means the default package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId {
    pub package: String,
    pub name: String,
}

impl ClassId {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Dotted qualified name (`com.example.Foo`, or `Foo` in the default package).
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}.", self.package)?;
        }
        f.write_str(&self.name)
    }
}

/// Why one class depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Extends or implements.
    Inherits,
    /// A method call or member access resolved to the target class.
    Invokes,
}

/// How a linear order over a class set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStrategy {
    /// A true topological order of the induced subgraph.
    Topological,
    /// The subgraph had a cycle; reversed DFS post-order was used instead.
    DfsFallback,
}

/// A resolved edge, as returned by [`DependencyGraph::edges`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: ClassId,
    pub target: ClassId,
    pub kind: EdgeKind,
}

/// Directed class graph. Not a multigraph: one edge per `(source, target)`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ClassId, EdgeKind>,
    nodes: HashMap<ClassId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class node. Registering an existing class is a no-op.
    pub fn add_class(&mut self, id: ClassId) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.nodes.insert(id, idx);
        idx
    }

    /// Add `source -> target`. Returns false if either endpoint is not a
    /// registered node or the edge already exists.
    pub fn add_edge(&mut self, source: &ClassId, target: &ClassId, kind: EdgeKind) -> bool {
        let (Some(&from), Some(&to)) = (self.nodes.get(source), self.nodes.get(target)) else {
            return false;
        };
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, kind);
        true
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_edge(&self, source: &ClassId, target: &ClassId) -> bool {
        match (self.nodes.get(source), self.nodes.get(target)) {
            (Some(&from), Some(&to)) => self.graph.find_edge(from, to).is_some(),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &ClassId) -> Option<NodeIndex> {
        self.nodes.get(id).copied()
    }

    /// Classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassId> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Every class registered under `simple_name`, in registration order.
    pub fn find_by_name(&self, simple_name: &str) -> Vec<&ClassId> {
        self.classes().filter(|id| id.name == simple_name).collect()
    }

    /// All edges, sorted by `(source, target)` registration order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut refs: Vec<_> = self.graph.edge_references().collect();
        refs.sort_by_key(|e| (e.source().index(), e.target().index()));
        refs.into_iter()
            .map(|e| Edge {
                source: self.graph[e.source()].clone(),
                target: self.graph[e.target()].clone(),
                kind: *e.weight(),
            })
            .collect()
    }

    /// Underlying petgraph graph, for traversal algorithms.
    pub fn inner(&self) -> &DiGraph<ClassId, EdgeKind> {
        &self.graph
    }
}
