//! Java metadata extraction for classflow.
//!
//! Two producers implement [`MetadataProducer`]: [`java::JavaTreeExtractor`]
//! walks a tree-sitter syntax tree, and [`fallback::RegexExtractor`] works on
//! raw text when the grammar is unavailable or disabled. [`parse_sources`]
//! runs either over a batch of files, optionally on the rayon pool, and turns
//! per-file failures into diagnostics instead of aborting the run.

pub mod fallback;
pub mod java;
pub mod treesitter;

use flow_core::diagnostics::{DiagnosticKind, Diagnostics};
use flow_core::error::FlowError;
use flow_core::model::{FileMetadata, SourceFile};
use rayon::prelude::*;
use std::path::Path;

pub use fallback::RegexExtractor;
pub use java::JavaTreeExtractor;

/// Turns one source file into [`FileMetadata`].
pub trait MetadataProducer: Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn extract(&self, path: &Path, source: &str) -> Result<FileMetadata, FlowError>;
}

/// Pick the tree-sitter extractor unless `force_fallback` is set or the
/// grammar fails to load.
pub fn select_producer(force_fallback: bool) -> Box<dyn MetadataProducer> {
    if force_fallback {
        tracing::info!("tree-sitter disabled, using regex extraction");
        return Box::new(RegexExtractor);
    }
    match JavaTreeExtractor::new() {
        Ok(extractor) => Box::new(extractor),
        Err(e) => {
            tracing::warn!("{}; falling back to regex extraction", e);
            Box::new(RegexExtractor)
        }
    }
}

/// Metadata for every file that parsed, in input order, plus one
/// [`DiagnosticKind::ParseFailure`] per file that did not.
#[derive(Debug, Default)]
pub struct ParsedFiles {
    pub files: Vec<FileMetadata>,
    pub diagnostics: Diagnostics,
}

/// Extract metadata from all `sources`. Output order matches input order
/// whether or not `parallel` is set.
pub fn parse_sources(
    sources: &[SourceFile],
    producer: &dyn MetadataProducer,
    parallel: bool,
) -> ParsedFiles {
    let extract = |src: &SourceFile| producer.extract(&src.path, &src.text);
    let results: Vec<Result<FileMetadata, FlowError>> = if parallel {
        sources.par_iter().map(extract).collect()
    } else {
        sources.iter().map(extract).collect()
    };

    let mut parsed = ParsedFiles::default();
    for result in results {
        match result {
            Ok(meta) => parsed.files.push(meta),
            Err(e) => parsed
                .diagnostics
                .push(DiagnosticKind::ParseFailure, e.to_string()),
        }
    }
    tracing::debug!(
        producer = producer.name(),
        files = parsed.files.len(),
        failed = parsed.diagnostics.count(DiagnosticKind::ParseFailure),
        "metadata extracted"
    );
    parsed
}
