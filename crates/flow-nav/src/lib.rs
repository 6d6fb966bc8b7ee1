//! Closure, ordering and rendering over the class dependency graph.
//!
//! [`plan_flow`] takes a built graph and a target name through the whole
//! back half of a run: target lookup, two-way closure, dependency order and
//! snippet extraction. [`export`] turns the result into the merged source
//! artifact and its manifest.

pub mod closure;
pub mod export;
pub mod order;
pub mod snippets;

use flow_core::config::OutputConfig;
use flow_core::diagnostics::{DiagnosticKind, Diagnostics};
use flow_core::error::FlowError;
use flow_core::graph::{ClassId, DependencyGraph, OrderStrategy};
use flow_core::model::{ClassRegistry, SourceFile};
use flow_core::schema::FlowManifest;

pub use closure::{closure, resolve_target};
pub use order::{Ordering, order};
pub use snippets::{Snippet, SnippetSet, extract_snippets};

#[derive(Debug, Clone, Copy)]
pub struct FlowOptions {
    /// Rebuild classes from their methods instead of emitting whole spans.
    pub methods_only: bool,
    /// Known class names listed when the target is missing.
    pub target_sample: usize,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            methods_only: true,
            target_sample: closure::DEFAULT_TARGET_SAMPLE,
        }
    }
}

impl From<&OutputConfig> for FlowOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            methods_only: config.methods_only,
            target_sample: config.target_sample,
        }
    }
}

/// Everything needed to write one target's artifacts.
#[derive(Debug, Clone)]
pub struct Flow {
    pub target: ClassId,
    pub ordering: Ordering,
    pub snippets: SnippetSet,
}

impl Flow {
    pub fn strategy(&self) -> OrderStrategy {
        self.ordering.strategy
    }

    pub fn render(&self) -> String {
        export::render_flow(&self.snippets)
    }

    pub fn manifest(&self) -> FlowManifest {
        export::build_manifest(&self.target, self.ordering.strategy, &self.snippets)
    }
}

/// Resolve `target`, collect its closure, order it and slice the code.
///
/// A cyclic closure is not an error; it is ordered by the DFS fallback and
/// recorded as a [`DiagnosticKind::CycleFallback`].
pub fn plan_flow(
    graph: &DependencyGraph,
    registry: &ClassRegistry<'_>,
    sources: &[SourceFile],
    target: &str,
    options: &FlowOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Flow, FlowError> {
    let target = resolve_target(graph, target, options.target_sample)?.clone();
    let nodes = closure(graph, &target)?;
    let ordering = order(graph, &nodes);

    if ordering.strategy == OrderStrategy::DfsFallback {
        let groups: Vec<String> = ordering
            .cycles
            .iter()
            .map(|group| {
                let names: Vec<String> = group.iter().map(ToString::to_string).collect();
                format!("[{}]", names.join(", "))
            })
            .collect();
        diagnostics.push(
            DiagnosticKind::CycleFallback,
            format!(
                "closure of {} is cyclic {}, classes ordered by DFS post-order",
                target,
                groups.join(" ")
            ),
        );
    }

    let snippets = extract_snippets(&ordering.nodes, registry, sources, options.methods_only);
    tracing::info!(
        target = %target,
        closure = nodes.len(),
        emitted = snippets.snippets.len(),
        strategy = ?ordering.strategy,
        "flow planned"
    );
    Ok(Flow {
        target,
        ordering,
        snippets,
    })
}
