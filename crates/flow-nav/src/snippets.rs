//! Slice class code out of source files for the merged artifact.

use flow_core::graph::ClassId;
use flow_core::model::{ClassMetadata, ClassRegistry, SourceFile};
use flow_core::source::{blank_non_code, line_at, matching_brace};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Code for one class, traceable to its file and line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub class: ClassId,
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub code: String,
}

/// Snippets in emission order plus the imports of every contributing file.
#[derive(Debug, Clone, Default)]
pub struct SnippetSet {
    pub imports: BTreeSet<String>,
    pub snippets: Vec<Snippet>,
}

/// Extract code for every class in `order`.
///
/// With `methods_only`, a class with recorded methods is rebuilt as its
/// header plus each method; a class without methods is always emitted whole.
/// Classes missing from the registry or whose file text is unavailable are
/// skipped with a warning.
pub fn extract_snippets(
    order: &[ClassId],
    registry: &ClassRegistry<'_>,
    sources: &[SourceFile],
    methods_only: bool,
) -> SnippetSet {
    let texts: HashMap<&Path, &str> = sources
        .iter()
        .map(|s| (s.path.as_path(), s.text.as_str()))
        .collect();

    let mut set = SnippetSet::default();
    for id in order {
        let Some(record) = registry.get(id) else {
            tracing::warn!(class = %id, "class has no declaration, skipping");
            continue;
        };
        let Some(&text) = texts.get(record.file.path.as_path()) else {
            tracing::warn!(class = %id, file = %record.file.path.display(), "source text unavailable");
            continue;
        };
        let Some(located) = locate_class(record.class, text) else {
            tracing::warn!(class = %id, file = %record.file.path.display(), "class declaration not found");
            continue;
        };

        let code = if methods_only && !record.class.methods.is_empty() {
            methods_only_code(record.class, located.text, text)
        } else {
            located.text.to_string()
        };

        set.imports
            .extend(record.file.imports.iter().map(ToString::to_string));
        set.snippets.push(Snippet {
            class: id.clone(),
            file: record.file.path.clone(),
            start_line: located.start_line,
            end_line: located.end_line,
            code,
        });
    }
    set
}

struct Located<'t> {
    text: &'t str,
    start_line: usize,
    end_line: usize,
}

fn locate_class<'t>(class: &ClassMetadata, text: &'t str) -> Option<Located<'t>> {
    if let Some(span) = class.span
        && let Some(slice) = span.slice(text)
    {
        return Some(Located {
            text: slice,
            start_line: span.start_line,
            end_line: span.end_line,
        });
    }
    find_declaration(&class.simple_name, text)
}

/// Best-effort location of a class whose span is unknown: the line holding
/// `<keyword> <Name>`, through the brace that closes its body.
fn find_declaration<'t>(name: &str, text: &'t str) -> Option<Located<'t>> {
    let code = blank_non_code(text);
    let found = declaration_keyword(name)?.find(&code)?;

    let start = code[..found.start()].rfind('\n').map_or(0, |i| i + 1);
    let start_line = line_at(text, start);
    let end = code[found.end()..]
        .find('{')
        .and_then(|open| matching_brace(&code, found.end() + open));

    let end = match end {
        Some(end) => end,
        None => code[found.end()..]
            .find('\n')
            .map_or(code.len(), |i| found.end() + i),
    };
    let slice = text.get(start..end)?;
    Some(Located {
        text: slice,
        start_line,
        end_line: start_line + slice.matches('\n').count(),
    })
}

/// `<keyword> <Name>` as a whole-word pattern.
fn declaration_keyword(name: &str) -> Option<Regex> {
    let pattern = format!(
        r"\b(?:class|interface|enum|record)\s+{}\b",
        regex::escape(name)
    );
    Regex::new(&pattern).ok()
}

fn methods_only_code(class: &ClassMetadata, class_text: &str, file_text: &str) -> String {
    let blanked = blank_non_code(class_text);
    // Annotations before the keyword may hold braces of their own.
    let body_search = declaration_keyword(&class.simple_name)
        .and_then(|re| re.find(&blanked))
        .map_or(0, |m| m.end());
    let header_end = blanked[body_search..]
        .find('{')
        .map_or(class_text.len(), |i| body_search + i + 1);
    let mut out = class_text[..header_end].to_string();

    for (name, method) in class.methods_in_order() {
        let body = method
            .span
            .and_then(|span| {
                let start = line_start_if_indented(file_text, span.start_byte);
                file_text.get(start..span.end_byte)
            })
            .unwrap_or(method.raw_body_text.as_str());
        out.push_str("\n// ---- method: ");
        out.push_str(name);
        out.push('\n');
        out.push_str(body);
    }

    if class_text.trim_end().ends_with('}') {
        out.push_str("\n}");
    }
    out
}

/// Move `byte` back to the start of its line when only whitespace precedes it.
fn line_start_if_indented(text: &str, byte: usize) -> usize {
    let Some(prefix) = text.get(..byte) else {
        return byte;
    };
    let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
    if prefix[line_start..].chars().all(char::is_whitespace) {
        line_start
    } else {
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::model::{ClassKind, ClassRecord, FileMetadata, Import, MethodMetadata, Span};

    const SOURCE: &str = "package app;\n\nimport java.util.List;\n\npublic class Foo {\n    private int x;\n\n    void run() {\n        Bar.go();\n    }\n}\n";

    fn span_of(text: &str, needle: &str, end_needle: &str) -> Span {
        let start = text.find(needle).unwrap();
        let end = text[start..].find(end_needle).unwrap() + start + end_needle.len();
        Span {
            start_byte: start,
            end_byte: end,
            start_line: line_at(text, start),
            end_line: line_at(text, end - 1),
        }
    }

    fn foo_file(with_span: bool, with_method: bool) -> FileMetadata {
        let mut file = FileMetadata::new("app/Foo.java");
        file.package = Some("app".to_string());
        file.imports = vec![Import::parse("import java.util.List;").unwrap()];
        let mut class = ClassMetadata::new("Foo", ClassKind::Class);
        if with_span {
            class.span = Some(span_of(SOURCE, "public class Foo", "}\n}"));
        }
        if with_method {
            class.insert_method(
                "run",
                MethodMetadata {
                    span: Some(span_of(SOURCE, "void run()", "    }")),
                    ..MethodMetadata::default()
                },
            );
        }
        file.classes.insert("Foo".to_string(), class);
        file
    }

    fn extract(file: &FileMetadata, methods_only: bool) -> SnippetSet {
        let id = ClassId::new("app", "Foo");
        let mut registry = ClassRegistry::new();
        registry.insert(
            id.clone(),
            ClassRecord {
                file,
                class: &file.classes["Foo"],
            },
        );
        let sources = vec![SourceFile::new("app/Foo.java", SOURCE)];
        extract_snippets(&[id], &registry, &sources, methods_only)
    }

    #[test]
    fn test_methods_only_drops_fields() {
        let file = foo_file(true, true);
        let set = extract(&file, true);
        let snippet = &set.snippets[0];
        assert_eq!(snippet.start_line, 5);
        assert_eq!(snippet.end_line, 11);
        assert!(snippet.code.starts_with("public class Foo {"));
        assert!(snippet.code.contains("// ---- method: run\n    void run() {"));
        assert!(!snippet.code.contains("private int x"));
        assert!(snippet.code.ends_with("\n}"));
        assert_eq!(
            set.imports.iter().collect::<Vec<_>>(),
            vec!["import java.util.List;"]
        );
    }

    #[test]
    fn test_class_without_methods_is_emitted_whole() {
        let file = foo_file(true, false);
        let set = extract(&file, true);
        assert!(set.snippets[0].code.contains("private int x"));
    }

    #[test]
    fn test_full_classes_when_methods_only_disabled() {
        let file = foo_file(true, true);
        let set = extract(&file, false);
        assert!(set.snippets[0].code.contains("private int x"));
        assert!(!set.snippets[0].code.contains("// ---- method"));
    }

    #[test]
    fn test_header_skips_annotation_braces() {
        let text = "@SuppressWarnings({\"a\", \"b\"})\npublic class Foo {\n    void run() {\n        Bar.go();\n    }\n}";
        let mut class = ClassMetadata::new("Foo", ClassKind::Class);
        class.insert_method(
            "run",
            MethodMetadata {
                span: Some(span_of(text, "void run()", "    }")),
                ..MethodMetadata::default()
            },
        );
        let code = methods_only_code(&class, text, text);
        assert!(code.starts_with("@SuppressWarnings({\"a\", \"b\"})\npublic class Foo {\n// ---- method: run\n"));
        assert!(code.ends_with("    }\n}"));
    }

    #[test]
    fn test_unknown_span_uses_declaration_scan() {
        let file = foo_file(false, false);
        let set = extract(&file, true);
        let snippet = &set.snippets[0];
        assert_eq!(snippet.start_line, 5);
        assert_eq!(snippet.end_line, 11);
        assert!(snippet.code.starts_with("public class Foo {"));
        assert!(snippet.code.ends_with("}\n}"));
    }

    #[test]
    fn test_unclosed_declaration_emits_single_line() {
        let text = "// class Foo in a comment\npublic class Foo extends Base {\n  void f() {\n";
        let located = find_declaration("Foo", text).unwrap();
        assert_eq!(located.text, "public class Foo extends Base {");
        assert_eq!(located.start_line, 2);
        assert_eq!(located.end_line, 2);
    }

    #[test]
    fn test_declaration_scan_ignores_prefixed_names() {
        let text = "class FooBar {}\nclass Foo {}\n";
        let located = find_declaration("Foo", text).unwrap();
        assert_eq!(located.text, "class Foo {}");
        assert_eq!(located.start_line, 2);
    }

    #[test]
    fn test_missing_class_is_skipped() {
        let registry = ClassRegistry::new();
        let set = extract_snippets(&[ClassId::new("app", "Nope")], &registry, &[], true);
        assert!(set.snippets.is_empty());
        assert!(set.imports.is_empty());
    }
}
