//! Dependency-respecting linear order over a class set.
//!
//! The set induces a subgraph of the dependency graph (self-loops dropped).
//! An acyclic subgraph gets a true topological order: for every edge
//! `u -> v`, `u` comes first. A cyclic one falls back to reversed DFS
//! post-order, which still lists every class exactly once but cannot honour
//! the edges inside a cycle.

use flow_core::graph::{ClassId, DependencyGraph, EdgeKind, OrderStrategy};
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeSet;

/// A linear order and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub nodes: Vec<ClassId>,
    pub strategy: OrderStrategy,
    /// Strongly connected groups of two or more classes that forced the
    /// fallback. Empty for a topological order.
    pub cycles: Vec<Vec<ClassId>>,
}

/// Order `nodes` along the edges of `graph`.
///
/// Classes in `nodes` that are not in the graph have no constraints and are
/// appended at the end in set order.
pub fn order(graph: &DependencyGraph, nodes: &BTreeSet<ClassId>) -> Ordering {
    let inner = graph.inner();
    let sub: DiGraph<ClassId, EdgeKind> = inner.filter_map(
        |_, id| nodes.contains(id).then(|| id.clone()),
        |edge, kind| {
            let (from, to) = inner.edge_endpoints(edge)?;
            (from != to).then_some(*kind)
        },
    );

    let (indices, strategy, cycles) = match toposort(&sub, None) {
        Ok(sorted) => (sorted, OrderStrategy::Topological, Vec::new()),
        Err(cycle) => {
            tracing::debug!(at = %sub[cycle.node_id()], "cycle in closure, using DFS order");
            (
                reversed_post_order(&sub),
                OrderStrategy::DfsFallback,
                cyclic_groups(&sub),
            )
        }
    };

    let mut ordered: Vec<ClassId> = indices.into_iter().map(|idx| sub[idx].clone()).collect();
    for id in nodes {
        if !graph.contains(id) {
            ordered.push(id.clone());
        }
    }

    Ordering {
        nodes: ordered,
        strategy,
        cycles,
    }
}

/// Depth-first post-order from every node in insertion order, visiting
/// successors in ascending index order, then reversed.
fn reversed_post_order(graph: &DiGraph<ClassId, EdgeKind>) -> Vec<NodeIndex> {
    let mut visited = vec![false; graph.node_count()];
    let mut post = Vec::with_capacity(graph.node_count());

    for root in graph.node_indices() {
        if visited[root.index()] {
            continue;
        }
        visited[root.index()] = true;
        let mut stack = vec![(root, sorted_successors(graph, root), 0usize)];

        while let Some((node, successors, next)) = stack.last_mut() {
            if let Some(&succ) = successors.get(*next) {
                *next += 1;
                if !visited[succ.index()] {
                    visited[succ.index()] = true;
                    let succs = sorted_successors(graph, succ);
                    stack.push((succ, succs, 0));
                }
            } else {
                post.push(*node);
                stack.pop();
            }
        }
    }

    post.reverse();
    post
}

fn sorted_successors(graph: &DiGraph<ClassId, EdgeKind>, node: NodeIndex) -> Vec<NodeIndex> {
    let mut out: Vec<NodeIndex> = graph.neighbors(node).collect();
    out.sort();
    out.dedup();
    out
}

fn cyclic_groups(graph: &DiGraph<ClassId, EdgeKind>) -> Vec<Vec<ClassId>> {
    let mut groups: Vec<Vec<NodeIndex>> = kosaraju_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    groups.sort();
    groups
        .into_iter()
        .map(|scc| scc.into_iter().map(|idx| graph[idx].clone()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(names: &[&str], edges: &[(usize, usize)]) -> (DependencyGraph, Vec<ClassId>) {
        let mut g = DependencyGraph::new();
        let ids: Vec<ClassId> = names.iter().map(|n| ClassId::new("app", *n)).collect();
        for id in &ids {
            g.add_class(id.clone());
        }
        for &(a, b) in edges {
            g.add_edge(&ids[a], &ids[b], EdgeKind::Invokes);
        }
        (g, ids)
    }

    fn names(ordering: &Ordering) -> Vec<&str> {
        ordering.nodes.iter().map(|id| id.name.as_str()).collect()
    }

    #[test]
    fn test_chain_is_topological() {
        let (g, ids) = graph(&["Repository", "Service", "Controller"], &[(2, 1), (1, 0)]);
        let set: BTreeSet<ClassId> = ids.into_iter().collect();
        let ordering = order(&g, &set);
        assert_eq!(ordering.strategy, OrderStrategy::Topological);
        assert_eq!(names(&ordering), vec!["Controller", "Service", "Repository"]);
        assert!(ordering.cycles.is_empty());
    }

    #[test]
    fn test_edges_outside_set_are_ignored() {
        // B -> A would force B first, but B is not in the set.
        let (g, ids) = graph(&["A", "B", "C"], &[(1, 0), (0, 2)]);
        let set: BTreeSet<ClassId> = [ids[0].clone(), ids[2].clone()].into_iter().collect();
        let ordering = order(&g, &set);
        assert_eq!(names(&ordering), vec!["A", "C"]);
    }

    #[test]
    fn test_self_loop_does_not_force_fallback() {
        let (g, ids) = graph(&["A", "B"], &[(0, 0), (0, 1)]);
        let set: BTreeSet<ClassId> = ids.into_iter().collect();
        let ordering = order(&g, &set);
        assert_eq!(ordering.strategy, OrderStrategy::Topological);
        assert_eq!(names(&ordering), vec!["A", "B"]);
    }

    #[test]
    fn test_two_cycle_uses_dfs_fallback() {
        let (g, ids) = graph(&["A", "B"], &[(0, 1), (1, 0)]);
        let set: BTreeSet<ClassId> = ids.into_iter().collect();
        let ordering = order(&g, &set);
        assert_eq!(ordering.strategy, OrderStrategy::DfsFallback);
        assert_eq!(names(&ordering), vec!["A", "B"]);
        assert_eq!(ordering.cycles.len(), 1);
        assert_eq!(ordering.cycles[0].len(), 2);
    }

    #[test]
    fn test_fallback_keeps_acyclic_edges_in_order() {
        // X -> A <-> B -> Y
        let (g, ids) = graph(&["Y", "B", "A", "X"], &[(3, 2), (2, 1), (1, 2), (1, 0)]);
        let set: BTreeSet<ClassId> = ids.into_iter().collect();
        let ordering = order(&g, &set);
        assert_eq!(ordering.strategy, OrderStrategy::DfsFallback);
        let pos = |n: &str| ordering.nodes.iter().position(|id| id.name == n).unwrap();
        assert!(pos("X") < pos("A"));
        assert!(pos("B") < pos("Y"));
        assert_eq!(ordering.nodes.len(), 4);
    }
}
