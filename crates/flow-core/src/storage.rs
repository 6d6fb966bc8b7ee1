//! Write extraction artifacts to disk.

use crate::schema::{self, FlowManifest};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of the two artifacts produced by one run.
#[derive(Debug, Clone)]
pub struct FlowOutputs {
    pub source: PathBuf,
    pub manifest: PathBuf,
}

/// `<out_dir>/<target>_flow.java`
pub fn source_path(out_dir: &Path, target: &str) -> PathBuf {
    out_dir.join(format!("{}_flow.java", target))
}

/// `<out_dir>/<target>_flow.json`
pub fn manifest_path(out_dir: &Path, target: &str) -> PathBuf {
    out_dir.join(format!("{}_flow.json", target))
}

/// Write the merged source and the manifest, creating `out_dir` if needed.
pub fn write_outputs(
    out_dir: &Path,
    target: &str,
    merged_source: &str,
    manifest: &FlowManifest,
) -> Result<FlowOutputs> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let source = source_path(out_dir, target);
    fs::write(&source, merged_source)
        .with_context(|| format!("failed to write {}", source.display()))?;

    let manifest_file = manifest_path(out_dir, target);
    let json = schema::to_json(manifest)?;
    fs::write(&manifest_file, json)
        .with_context(|| format!("failed to write {}", manifest_file.display()))?;

    Ok(FlowOutputs {
        source,
        manifest: manifest_file,
    })
}

/// Load a manifest previously written by [`write_outputs`].
pub fn load_manifest(path: &Path) -> Result<FlowManifest> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest from {}", path.display()))?;
    schema::from_json(&json)
}
