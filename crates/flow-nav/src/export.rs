//! Render the merged flow source and its ordering manifest.

use crate::snippets::SnippetSet;
use flow_core::graph::{ClassId, OrderStrategy};
use flow_core::schema::{FlowManifest, SequenceEntry};
use std::fmt::Write;

/// Merged source: imports, then every snippet under a numbered banner.
pub fn render_flow(set: &SnippetSet) -> String {
    let mut out = String::new();
    for import in &set.imports {
        writeln!(out, "{}", import).unwrap();
    }
    if !set.imports.is_empty() {
        writeln!(out).unwrap();
    }

    for (i, snippet) in set.snippets.iter().enumerate() {
        writeln!(
            out,
            "// === {}. {}  (from {} lines {}-{})",
            i + 1,
            snippet.class,
            snippet.file.display(),
            snippet.start_line,
            snippet.end_line
        )
        .unwrap();
        writeln!(out, "{}", snippet.code.trim_end()).unwrap();
        writeln!(out).unwrap();
    }
    out
}

/// Manifest listing the emitted classes with 1-based indices.
pub fn build_manifest(target: &ClassId, strategy: OrderStrategy, set: &SnippetSet) -> FlowManifest {
    let mut manifest = FlowManifest::new(target.qualified(), strategy);
    manifest.sequence = set
        .snippets
        .iter()
        .enumerate()
        .map(|(i, snippet)| SequenceEntry {
            index: i + 1,
            class: snippet.class.qualified(),
            file: snippet.file.display().to_string(),
            start_line: snippet.start_line,
            end_line: snippet.end_line,
        })
        .collect();
    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::Snippet;
    use std::path::PathBuf;

    fn sample() -> SnippetSet {
        let mut set = SnippetSet::default();
        set.imports.insert("import java.util.List;".to_string());
        set.imports.insert("import com.app.model.User;".to_string());
        set.snippets = vec![
            Snippet {
                class: ClassId::new("com.app", "Controller"),
                file: PathBuf::from("com/app/Controller.java"),
                start_line: 3,
                end_line: 9,
                code: "class Controller {\n}\n\n".to_string(),
            },
            Snippet {
                class: ClassId::new("", "Service"),
                file: PathBuf::from("Service.java"),
                start_line: 1,
                end_line: 4,
                code: "class Service {\n}".to_string(),
            },
        ];
        set
    }

    #[test]
    fn test_render_flow_layout() {
        let text = render_flow(&sample());
        let expected = "import com.app.model.User;\n\
                        import java.util.List;\n\
                        \n\
                        // === 1. com.app.Controller  (from com/app/Controller.java lines 3-9)\n\
                        class Controller {\n\
                        }\n\
                        \n\
                        // === 2. Service  (from Service.java lines 1-4)\n\
                        class Service {\n\
                        }\n\
                        \n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_without_imports_starts_with_banner() {
        let mut set = sample();
        set.imports.clear();
        assert!(render_flow(&set).starts_with("// === 1."));
    }

    #[test]
    fn test_manifest_sequence() {
        let target = ClassId::new("com.app", "Controller");
        let manifest = build_manifest(&target, OrderStrategy::DfsFallback, &sample());
        assert_eq!(manifest.target, "com.app.Controller");
        assert_eq!(manifest.strategy, OrderStrategy::DfsFallback);
        assert_eq!(manifest.sequence.len(), 2);
        assert_eq!(manifest.sequence[0].index, 1);
        assert_eq!(manifest.sequence[1].class, "Service");
        assert_eq!(manifest.sequence[1].file, "Service.java");
        assert_eq!(manifest.sequence[0].end_line, 9);
    }
}
