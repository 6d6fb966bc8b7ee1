//! Typed errors for the extraction pipeline.

use std::path::PathBuf;

/// Errors that stop a run (or, for [`FlowError::Parse`], a single file).
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("project directory {} does not exist", .0.display())]
    InputNotFound(PathBuf),
    #[error("no source files found under {}", .0.display())]
    NoSourceFiles(PathBuf),
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("tree-sitter grammar unavailable: {0}")]
    Grammar(String),
    #[error("target class {target} not found (known classes: {})", .sample.join(", "))]
    TargetNotFound { target: String, sample: Vec<String> },
    #[error("target class {target} is ambiguous, candidates: {}", .candidates.join(", "))]
    AmbiguousTarget {
        target: String,
        candidates: Vec<String>,
    },
    #[error("manifest error: {0}")]
    Manifest(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FlowError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
