//! Dependency graph construction from per-file metadata.
//!
//! Nodes are registered for every declared class first, then inheritance
//! edges and call edges are added. Edges only ever point at registered
//! nodes, so unresolved or external references never create nodes.

use crate::resolve::{Resolution, ResolveOptions, ResolveScope, resolve_token, resolve_type};
use crate::symbols::SymbolIndex;
use crate::tokens::call_tokens;
use flow_core::config::ResolutionConfig;
use flow_core::diagnostics::{DiagnosticKind, Diagnostics};
use flow_core::graph::{ClassId, DependencyGraph, EdgeKind};
use flow_core::model::{ClassRecord, ClassRegistry, FileMetadata};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub resolve: ResolveOptions,
    /// Resolve file-level call texts for classes without recorded methods.
    pub file_level_calls: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            file_level_calls: true,
        }
    }
}

impl From<&ResolutionConfig> for BuildOptions {
    fn from(config: &ResolutionConfig) -> Self {
        Self {
            resolve: ResolveOptions::from(config),
            file_level_calls: config.file_level_calls,
        }
    }
}

/// Token outcome counts, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub ambiguous: usize,
    pub unresolved: usize,
}

/// Result of [`build_graph`].
#[derive(Debug)]
pub struct GraphBuild<'a> {
    pub graph: DependencyGraph,
    pub registry: ClassRegistry<'a>,
    pub stats: ResolutionStats,
}

/// Build the class dependency graph over all files.
///
/// Every declaration contributes edges, including one that lost its
/// registry slot to a later declaration of the same identity.
pub fn build_graph<'a>(
    files: &'a [FileMetadata],
    index: &SymbolIndex,
    options: &BuildOptions,
    diagnostics: &mut Diagnostics,
) -> GraphBuild<'a> {
    let mut build = GraphBuild {
        graph: DependencyGraph::new(),
        registry: ClassRegistry::new(),
        stats: ResolutionStats::default(),
    };

    // Step A: nodes.
    for file in files {
        for class in file.classes_in_order() {
            let id = ClassId::new(file.package_name(), class.simple_name.as_str());
            build.graph.add_class(id.clone());
            if let Some(previous) = build.registry.insert(id.clone(), ClassRecord { file, class }) {
                diagnostics.push(
                    DiagnosticKind::DuplicateClassName,
                    format!(
                        "{} declared in {} and {}, keeping the latter",
                        id,
                        previous.file.path.display(),
                        file.path.display()
                    ),
                );
            }
        }
    }

    let mut builder = EdgeBuilder {
        index,
        options,
        diagnostics,
        reported: HashSet::new(),
        stats: ResolutionStats::default(),
    };

    // Step B: inheritance.
    for file in files {
        for class in file.classes_in_order() {
            let source = ClassId::new(file.package_name(), class.simple_name.as_str());
            for parent in class.parents() {
                let resolution = resolve_type(
                    parent,
                    &file.imports,
                    file.package_name(),
                    index,
                    &options.resolve,
                );
                builder.record(&mut build.graph, &source, parent, resolution, EdgeKind::Inherits);
            }
        }
    }

    // Step C: calls.
    for file in files {
        for class in file.classes_in_order() {
            let source = ClassId::new(file.package_name(), class.simple_name.as_str());
            for (_, method) in class.methods_in_order() {
                let scope = ResolveScope {
                    locals: Some(&method.locals),
                    fields: Some(&class.fields),
                    imports: &file.imports,
                    package: file.package_name(),
                };
                for token in call_tokens(&method.raw_body_text) {
                    builder.call(&mut build.graph, &source, &token, &scope);
                }
            }

            // Method attribution is unavailable; fall back to the file's calls.
            if options.file_level_calls && class.methods.is_empty() {
                let scope = ResolveScope {
                    locals: None,
                    fields: Some(&class.fields),
                    imports: &file.imports,
                    package: file.package_name(),
                };
                let tokens: BTreeSet<String> = file
                    .file_level_calls
                    .iter()
                    .flat_map(|text| call_tokens(text))
                    .collect();
                for token in &tokens {
                    builder.call(&mut build.graph, &source, token, &scope);
                }
            }
        }
    }

    build.stats = builder.stats;
    tracing::info!(
        classes = build.graph.node_count(),
        edges = build.graph.edge_count(),
        resolved = build.stats.resolved,
        ambiguous = build.stats.ambiguous,
        unresolved = build.stats.unresolved,
        "dependency graph built"
    );
    build
}

struct EdgeBuilder<'b> {
    index: &'b SymbolIndex,
    options: &'b BuildOptions,
    diagnostics: &'b mut Diagnostics,
    /// `(source, name)` pairs already reported as ambiguous.
    reported: HashSet<(ClassId, String)>,
    stats: ResolutionStats,
}

impl EdgeBuilder<'_> {
    fn call(
        &mut self,
        graph: &mut DependencyGraph,
        source: &ClassId,
        token: &str,
        scope: &ResolveScope<'_>,
    ) {
        let resolution = resolve_token(token, scope, self.index, &self.options.resolve);
        self.record(graph, source, token, resolution, EdgeKind::Invokes);
    }

    fn record(
        &mut self,
        graph: &mut DependencyGraph,
        source: &ClassId,
        name: &str,
        resolution: Resolution,
        kind: EdgeKind,
    ) {
        match resolution {
            Resolution::Resolved { id, via } => {
                self.stats.resolved += 1;
                if graph.add_edge(source, &id, kind) {
                    tracing::trace!(%source, target = %id, ?via, ?kind, "edge");
                }
            }
            Resolution::Ambiguous(candidates) => {
                self.stats.ambiguous += 1;
                if self.reported.insert((source.clone(), name.to_string())) {
                    let names: Vec<String> = candidates.iter().map(ToString::to_string).collect();
                    self.diagnostics.push(
                        DiagnosticKind::AmbiguousReference,
                        format!("{} in {} matches {}", name, source, names.join(", ")),
                    );
                }
            }
            Resolution::Unresolved => self.stats.unresolved += 1,
            Resolution::Skipped => {}
        }
    }
}
