//! Dependency resolution for classflow.
//!
//! Builds the project-wide [`symbols::SymbolIndex`], scans method text for
//! call tokens, resolves each token through the layered textual heuristic in
//! [`resolve`], and assembles the class dependency graph in [`grounding`].

pub mod grounding;
pub mod resolve;
pub mod symbols;
pub mod tokens;

use flow_core::config::ResolutionConfig;
use flow_core::diagnostics::Diagnostics;
use flow_core::model::FileMetadata;

pub use grounding::{BuildOptions, GraphBuild, ResolutionStats, build_graph};
pub use resolve::{Resolution, Via};
pub use symbols::SymbolIndex;

/// Index all files and build the dependency graph in one step.
pub fn build_dependency_graph<'a>(
    files: &'a [FileMetadata],
    config: &ResolutionConfig,
    diagnostics: &mut Diagnostics,
) -> GraphBuild<'a> {
    let index = SymbolIndex::build(files, diagnostics);
    build_graph(files, &index, &BuildOptions::from(config), diagnostics)
}
