//! Configuration for extraction, resolution, and output settings.
//!
//! Load order: `.classflow/config.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level classflow configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub extraction: ExtractionConfig,
    pub resolution: ResolutionConfig,
    pub output: OutputConfig,
}

/// Source discovery and parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// File extensions (without dot) treated as source files.
    pub extensions: Vec<String>,
    /// Parse files on the rayon thread pool.
    pub parallel: bool,
    /// Use the regex metadata producer even when the tree-sitter grammar loads.
    pub force_fallback: bool,
}

/// Call-token resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Accept a project-wide unique simple name as a last resort.
    /// Unsound when two packages define the same simple name.
    pub global_fallback: bool,
    /// Resolve file-level call texts for classes without recorded methods.
    pub file_level_calls: bool,
}

/// Snippet extraction and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit class header plus method bodies instead of the full class span.
    pub methods_only: bool,
    /// Number of known class names listed when the target is not found.
    pub target_sample: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["java".to_string()],
            parallel: true,
            force_fallback: false,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            global_fallback: true,
            file_level_calls: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            methods_only: true,
            target_sample: 50,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl FlowConfig {
    /// Load config from `.classflow/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".classflow").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        // Extensions are matched case-insensitively and without a leading dot.
        config.extraction.extensions = std::mem::take(&mut config.extraction.extensions)
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        env_override("CLASSFLOW_PARALLEL", &mut config.extraction.parallel);
        env_override(
            "CLASSFLOW_FORCE_FALLBACK",
            &mut config.extraction.force_fallback,
        );
        env_override(
            "CLASSFLOW_GLOBAL_FALLBACK",
            &mut config.resolution.global_fallback,
        );
        env_override(
            "CLASSFLOW_FILE_LEVEL_CALLS",
            &mut config.resolution.file_level_calls,
        );
        env_override("CLASSFLOW_METHODS_ONLY", &mut config.output.methods_only);
        env_override("CLASSFLOW_TARGET_SAMPLE", &mut config.output.target_sample);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.extensions.is_empty() {
            anyhow::bail!("extraction.extensions must list at least one extension");
        }
        if self.output.target_sample == 0 {
            anyhow::bail!("output.target_sample must be greater than zero");
        }
        Ok(())
    }

    /// Whether `ext` (no dot) is a configured source extension.
    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.extraction
            .extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
