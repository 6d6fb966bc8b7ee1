//! Orchestration behind the `classflow` binary.

pub mod discover;
pub mod pipeline;

pub use discover::{FileFilter, collect_source_files};
pub use pipeline::{ExtractReport, ParsedProject, extract, parse_project};
