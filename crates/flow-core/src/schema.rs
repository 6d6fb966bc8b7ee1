//! Ordering manifest written next to the merged source artifact.

use crate::graph::OrderStrategy;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: &str = "1.0.0";

/// Structured description of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowManifest {
    pub version: String,
    /// Qualified name of the target class.
    pub target: String,
    pub generated_at: DateTime<Utc>,
    pub strategy: OrderStrategy,
    pub sequence: Vec<SequenceEntry>,
}

/// One class in emitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// 1-based position in the merged artifact.
    pub index: usize,
    pub class: String,
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl FlowManifest {
    pub fn new(target: impl Into<String>, strategy: OrderStrategy) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            target: target.into(),
            generated_at: Utc::now(),
            strategy,
            sequence: Vec::new(),
        }
    }
}

/// Validate a manifest's schema version.
pub fn validate_version(manifest: &FlowManifest) -> Result<()> {
    if manifest.version != CURRENT_VERSION {
        anyhow::bail!(
            "manifest version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            manifest.version
        );
    }
    Ok(())
}

/// Serialize a manifest to a pretty-printed JSON string.
pub fn to_json(manifest: &FlowManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize manifest to JSON")
}

/// Deserialize a manifest from a JSON string.
pub fn from_json(json: &str) -> Result<FlowManifest> {
    let manifest: FlowManifest =
        serde_json::from_str(json).context("failed to deserialize manifest from JSON")?;
    validate_version(&manifest)?;
    Ok(manifest)
}
