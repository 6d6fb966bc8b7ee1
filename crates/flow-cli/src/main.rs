//! CLI binary for classflow: extract the dependency flow around a Java class.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flow_cli::{FileFilter, extract, parse_project};
use flow_core::config::FlowConfig;
use flow_core::diagnostics::{DiagnosticKind, Diagnostics};
use flow_core::error::FlowError;
use flow_core::graph::{ClassId, OrderStrategy};
use flow_resolve::build_dependency_graph;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "classflow", about = "Java class dependency flow extractor")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write <Target>_flow.java and <Target>_flow.json for a target class
    Extract {
        /// Target class, simple or qualified name (e.g. CreateAccount)
        #[arg(short, long)]
        target: String,

        /// Output directory for generated files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Use the regex extractor instead of tree-sitter
        #[arg(long)]
        no_tree_sitter: bool,

        /// Emit full class bodies instead of header plus methods
        #[arg(long)]
        full_classes: bool,

        /// Glob patterns to include files (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude files (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Show class and edge counts plus diagnostics
    Info {
        /// Use the regex extractor instead of tree-sitter
        #[arg(long)]
        no_tree_sitter: bool,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every registered class with its file
    Classes {
        /// Use the regex extractor instead of tree-sitter
        #[arg(long)]
        no_tree_sitter: bool,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn load_config(project_root: &Path, no_tree_sitter: bool) -> Result<FlowConfig> {
    let mut config = FlowConfig::load(project_root)
        .with_context(|| format!("failed to load config for {}", project_root.display()))?;
    if no_tree_sitter {
        config.extraction.force_fallback = true;
    }
    Ok(config)
}

/// A project without source files ends the run without artifacts.
fn no_sources(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<FlowError>(),
        Some(FlowError::NoSourceFiles(_))
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;

    let result = match cli.command {
        Commands::Extract {
            target,
            out,
            no_tree_sitter,
            full_classes,
            include,
            exclude,
        } => cmd_extract(
            &project_root,
            &target,
            &out,
            no_tree_sitter,
            full_classes,
            FileFilter { include, exclude },
        ),
        Commands::Info {
            no_tree_sitter,
            json,
        } => cmd_info(&project_root, no_tree_sitter, json),
        Commands::Classes { no_tree_sitter } => cmd_classes(&project_root, no_tree_sitter),
    };

    match result {
        Err(e) if no_sources(&e) => {
            eprintln!("{}; nothing to extract.", e);
            Ok(())
        }
        other => other,
    }
}

fn cmd_extract(
    project_root: &Path,
    target: &str,
    out: &Path,
    no_tree_sitter: bool,
    full_classes: bool,
    filter: FileFilter,
) -> Result<()> {
    let mut config = load_config(project_root, no_tree_sitter)?;
    if full_classes {
        config.output.methods_only = false;
    }

    eprintln!("Scanning project at: {}", project_root.display());
    let report = extract(project_root, &config, &filter, target, out)?;

    eprintln!("Final sequence:");
    for (i, class) in report.sequence.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, class);
    }
    if report.strategy == OrderStrategy::DfsFallback {
        eprintln!("  (cycle detected, order is DFS post-order)");
    }
    print_diagnostics(&report.diagnostics);

    eprintln!("\nFlow for {} written:", report.target);
    eprintln!("  Source: {}", report.outputs.source.display());
    eprintln!("  Manifest: {}", report.outputs.manifest.display());
    Ok(())
}

fn cmd_info(project_root: &Path, no_tree_sitter: bool, json: bool) -> Result<()> {
    let config = load_config(project_root, no_tree_sitter)?;
    let project = parse_project(project_root, &config, &FileFilter::default())?;
    let mut diagnostics = project.diagnostics;
    let build = build_dependency_graph(&project.files, &config.resolution, &mut diagnostics);

    if json {
        let items: Vec<_> = diagnostics.iter().collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!("Project: {}", project_root.display());
    println!("Extractor: {}", project.producer);
    println!("Files: {}", project.files.len());
    println!("Classes: {}", build.graph.node_count());
    println!("Dependency edges: {}", build.graph.edge_count());
    println!(
        "Call tokens: {} resolved, {} ambiguous, {} unresolved",
        build.stats.resolved, build.stats.ambiguous, build.stats.unresolved
    );
    print_diagnostics(&diagnostics);
    Ok(())
}

fn cmd_classes(project_root: &Path, no_tree_sitter: bool) -> Result<()> {
    let config = load_config(project_root, no_tree_sitter)?;
    let project = parse_project(project_root, &config, &FileFilter::default())?;
    let mut diagnostics = project.diagnostics;
    let build = build_dependency_graph(&project.files, &config.resolution, &mut diagnostics);

    let mut classes: Vec<&ClassId> = build.registry.keys().collect();
    classes.sort_by_key(|id| id.qualified());
    for id in classes {
        let record = &build.registry[id];
        println!(
            "{}\t{}\t{}",
            id,
            record.class.kind.keyword(),
            record.file.path.display()
        );
    }
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    let kinds = [
        DiagnosticKind::ParseFailure,
        DiagnosticKind::DuplicateClassName,
        DiagnosticKind::DuplicateSimpleName,
        DiagnosticKind::AmbiguousReference,
        DiagnosticKind::CycleFallback,
    ];
    let summary: Vec<String> = kinds
        .iter()
        .filter_map(|&kind| {
            let n = diagnostics.count(kind);
            (n > 0).then(|| format!("{} {}", n, kind.label()))
        })
        .collect();
    eprintln!("\nDiagnostics: {}", summary.join(", "));
    for d in diagnostics.iter() {
        eprintln!("  {}", d);
    }
}
