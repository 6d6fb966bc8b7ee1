//! Target lookup and the two-way reachability closure around it.

use flow_core::error::FlowError;
use flow_core::graph::{ClassId, DependencyGraph};
use petgraph::visit::{Bfs, Reversed};
use std::collections::BTreeSet;

/// Number of known classes listed when a target is missing.
pub const DEFAULT_TARGET_SAMPLE: usize = 50;

/// Find the node a user-supplied target name refers to.
///
/// An exact qualified name wins. Otherwise the trailing simple name is looked
/// up, and must match exactly one class.
pub fn resolve_target<'g>(
    graph: &'g DependencyGraph,
    target: &str,
    sample_size: usize,
) -> Result<&'g ClassId, FlowError> {
    let target = target.trim();
    if let Some(id) = graph.classes().find(|id| id.qualified() == target) {
        return Ok(id);
    }

    let simple = target.rsplit('.').next().unwrap_or(target);
    let matches = graph.find_by_name(simple);
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(FlowError::TargetNotFound {
            target: target.to_string(),
            sample: known_classes(graph, sample_size),
        }),
        many => Err(FlowError::AmbiguousTarget {
            target: target.to_string(),
            candidates: many.iter().map(ToString::to_string).collect(),
        }),
    }
}

/// Sorted qualified names of up to `limit` classes.
pub fn known_classes(graph: &DependencyGraph, limit: usize) -> Vec<String> {
    let mut names: Vec<String> = graph.classes().map(ClassId::qualified).collect();
    names.sort();
    names.truncate(limit);
    names
}

/// `target` plus everything it reaches and everything that reaches it.
///
/// Self-edges contribute nothing beyond the target itself.
pub fn closure(graph: &DependencyGraph, target: &ClassId) -> Result<BTreeSet<ClassId>, FlowError> {
    let Some(start) = graph.index_of(target) else {
        return Err(FlowError::TargetNotFound {
            target: target.to_string(),
            sample: known_classes(graph, DEFAULT_TARGET_SAMPLE),
        });
    };
    let inner = graph.inner();
    let mut nodes = BTreeSet::new();

    let mut forward = Bfs::new(inner, start);
    while let Some(idx) = forward.next(inner) {
        nodes.insert(inner[idx].clone());
    }

    let reversed = Reversed(inner);
    let mut backward = Bfs::new(reversed, start);
    while let Some(idx) = backward.next(reversed) {
        nodes.insert(inner[idx].clone());
    }

    tracing::debug!(target = %target, size = nodes.len(), "closure computed");
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::graph::EdgeKind;

    fn graph(nodes: &[(&str, &str)], edges: &[(usize, usize)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        let ids: Vec<ClassId> = nodes.iter().map(|(p, n)| ClassId::new(*p, *n)).collect();
        for id in &ids {
            g.add_class(id.clone());
        }
        for &(a, b) in edges {
            g.add_edge(&ids[a], &ids[b], EdgeKind::Invokes);
        }
        g
    }

    #[test]
    fn test_closure_both_directions() {
        // C -> S -> R, X isolated, U -> C
        let g = graph(
            &[("app", "C"), ("app", "S"), ("app", "R"), ("app", "X"), ("app", "U")],
            &[(0, 1), (1, 2), (4, 0)],
        );
        let set = closure(&g, &ClassId::new("app", "S")).unwrap();
        let names: Vec<&str> = set.iter().map(|id| id.name.as_str()).collect();
        assert_eq!(names, vec!["C", "R", "S", "U"]);
    }

    #[test]
    fn test_siblings_are_not_in_closure() {
        // A -> T, A -> B: B is neither reachable from T nor reaches T.
        let g = graph(&[("p", "A"), ("p", "T"), ("p", "B")], &[(0, 1), (0, 2)]);
        let set = closure(&g, &ClassId::new("p", "T")).unwrap();
        assert!(set.contains(&ClassId::new("p", "A")));
        assert!(!set.contains(&ClassId::new("p", "B")));
    }

    #[test]
    fn test_self_loop_closure_is_singleton() {
        let g = graph(&[("p", "A"), ("p", "B")], &[(0, 0)]);
        let set = closure(&g, &ClassId::new("p", "A")).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_resolve_target_variants() {
        let g = graph(&[("a", "Util"), ("b", "Util"), ("a", "Main")], &[]);
        assert_eq!(resolve_target(&g, "Main", 10).unwrap(), &ClassId::new("a", "Main"));
        assert_eq!(resolve_target(&g, "b.Util", 10).unwrap(), &ClassId::new("b", "Util"));
        assert_eq!(resolve_target(&g, "zzz.Main", 10).unwrap(), &ClassId::new("a", "Main"));

        match resolve_target(&g, "Util", 10) {
            Err(FlowError::AmbiguousTarget { candidates, .. }) => {
                assert_eq!(candidates, vec!["a.Util", "b.Util"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
        match resolve_target(&g, "Missing", 2) {
            Err(FlowError::TargetNotFound { sample, .. }) => {
                assert_eq!(sample, vec!["a.Main", "a.Util"]);
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_closure_of_unknown_node_fails() {
        let g = graph(&[("p", "A")], &[]);
        assert!(matches!(
            closure(&g, &ClassId::new("p", "Nope")),
            Err(FlowError::TargetNotFound { .. })
        ));
    }
}
