//! Source file discovery under a project root.

use anyhow::{Context, Result};
use flow_core::config::FlowConfig;
use flow_core::model::SourceFile;
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Ignore file honoured alongside `.gitignore`.
pub const IGNORE_FILE: &str = ".classflowignore";

/// Include/exclude glob patterns, matched against project-relative paths.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

fn build_glob_set(patterns: &[String], flag: &str) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p).with_context(|| format!("invalid {} glob: {}", flag, p))?);
    }
    Ok(Some(
        builder
            .build()
            .with_context(|| format!("invalid {} glob set", flag))?,
    ))
}

/// Collect source files with a configured extension, sorted by relative path.
///
/// Paths in the result are relative to `project_root`. Files that are not
/// valid UTF-8 are skipped with a warning.
pub fn collect_source_files(
    project_root: &Path,
    config: &FlowConfig,
    filter: &FileFilter,
) -> Result<Vec<SourceFile>> {
    let include_set = build_glob_set(&filter.include, "--include")?;
    let exclude_set = build_glob_set(&filter.exclude, "--exclude")?;

    let walker = ignore::WalkBuilder::new(project_root)
        .hidden(true)
        .git_ignore(true)
        .add_custom_ignore_filename(IGNORE_FILE)
        .build();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Scanning files...");

    let mut files = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.is_source_extension(ext) {
            continue;
        }
        let rel_path = path.strip_prefix(project_root).unwrap_or(path);
        if let Some(ref inc) = include_set
            && !inc.is_match(rel_path)
        {
            continue;
        }
        if let Some(ref exc) = exclude_set
            && exc.is_match(rel_path)
        {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(text) => {
                files.push(SourceFile::new(rel_path, text));
                spinner.set_message(format!("{} files collected", files.len()));
                spinner.tick();
            }
            Err(e) => tracing::warn!(file = %path.display(), "skipping unreadable file: {}", e),
        }
    }
    spinner.finish_and_clear();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = files.len(), root = %project_root.display(), "source files collected");
    Ok(files)
}
