//! End-to-end extraction run: discover, parse, build, plan, write.
//!
//! Parsing completes for every file before the graph is built; the graph,
//! registry and symbol index are rebuilt from scratch on each call.

use crate::discover::{FileFilter, collect_source_files};
use anyhow::Result;
use flow_core::config::FlowConfig;
use flow_core::diagnostics::Diagnostics;
use flow_core::error::FlowError;
use flow_core::graph::{ClassId, OrderStrategy};
use flow_core::model::{FileMetadata, SourceFile};
use flow_core::storage::{self, FlowOutputs};
use flow_nav::{FlowOptions, plan_flow};
use flow_parser::{parse_sources, select_producer};
use flow_resolve::build_dependency_graph;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Sources and metadata for one project.
#[derive(Debug)]
pub struct ParsedProject {
    pub sources: Vec<SourceFile>,
    pub files: Vec<FileMetadata>,
    pub producer: &'static str,
    pub diagnostics: Diagnostics,
}

/// Discover and parse every source file under `project_root`.
///
/// Fails with [`FlowError::InputNotFound`] when the root is missing and
/// [`FlowError::NoSourceFiles`] when nothing matched.
pub fn parse_project(
    project_root: &Path,
    config: &FlowConfig,
    filter: &FileFilter,
) -> Result<ParsedProject> {
    if !project_root.is_dir() {
        return Err(FlowError::InputNotFound(project_root.to_path_buf()).into());
    }

    let sources = collect_source_files(project_root, config, filter)?;
    if sources.is_empty() {
        return Err(FlowError::NoSourceFiles(project_root.to_path_buf()).into());
    }

    let producer = select_producer(config.extraction.force_fallback);
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  Parsing {msg} {spinner}")
            .expect("valid template"),
    );
    pb.set_message(format!("{} files with {}", sources.len(), producer.name()));
    let parsed = parse_sources(&sources, producer.as_ref(), config.extraction.parallel);
    pb.finish_and_clear();

    tracing::info!(
        files = parsed.files.len(),
        producer = producer.name(),
        "project parsed"
    );
    Ok(ParsedProject {
        sources,
        files: parsed.files,
        producer: producer.name(),
        diagnostics: parsed.diagnostics,
    })
}

/// Outcome of a successful [`extract`] run.
#[derive(Debug)]
pub struct ExtractReport {
    pub target: ClassId,
    pub sequence: Vec<ClassId>,
    pub strategy: OrderStrategy,
    pub outputs: FlowOutputs,
    pub diagnostics: Diagnostics,
}

/// Run the full pipeline for `target` and write both artifacts to `out_dir`.
///
/// Nothing is written when the target cannot be resolved.
pub fn extract(
    project_root: &Path,
    config: &FlowConfig,
    filter: &FileFilter,
    target: &str,
    out_dir: &Path,
) -> Result<ExtractReport> {
    let mut project = parse_project(project_root, config, filter)?;
    let mut diagnostics = std::mem::take(&mut project.diagnostics);

    let build = build_dependency_graph(&project.files, &config.resolution, &mut diagnostics);
    let flow = plan_flow(
        &build.graph,
        &build.registry,
        &project.sources,
        target,
        &FlowOptions::from(&config.output),
        &mut diagnostics,
    )?;

    let outputs = storage::write_outputs(out_dir, &flow.target.name, &flow.render(), &flow.manifest())?;
    tracing::info!(
        source = %outputs.source.display(),
        manifest = %outputs.manifest.display(),
        "flow written"
    );

    Ok(ExtractReport {
        sequence: flow.snippets.snippets.iter().map(|s| s.class.clone()).collect(),
        strategy: flow.strategy(),
        target: flow.target,
        outputs,
        diagnostics,
    })
}
