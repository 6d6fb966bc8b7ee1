//! Regex metadata producer.
//!
//! Used when the tree-sitter grammar cannot be loaded or is disabled. It
//! recognises declarations by shape only, so it is less precise than the tree
//! extractor: bodiless (abstract or interface) methods are not recorded and
//! locals are only bound for capitalised types, `var x = new T(..)` and
//! parameters. All matching runs on text with comments and literals blanked,
//! so braces and dots inside them never count.

use crate::MetadataProducer;
use flow_core::error::FlowError;
use flow_core::model::{
    ClassKind, ClassMetadata, FileMetadata, Import, MethodMetadata, Span, type_simple_name,
};
use flow_core::source::{blank_non_code, line_at, matching_brace};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Keywords that look like a method name in `kw (...) {`.
const CONTROL_KEYWORDS: &[&str] = &[
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "synchronized",
    "return",
    "new",
    "else",
    "try",
    "do",
    "throw",
];

/// Metadata producer that needs no grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl MetadataProducer for RegexExtractor {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn extract(&self, path: &Path, source: &str) -> Result<FileMetadata, FlowError> {
        Ok(extract_with_regex(path, source))
    }
}

/// Extract metadata from Java source without a parser. Never fails; text it
/// cannot make sense of is simply not reported.
pub fn extract_with_regex(path: &Path, source: &str) -> FileMetadata {
    static PACKAGE_RE: OnceLock<Regex> = OnceLock::new();
    static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
    static CLASS_RE: OnceLock<Regex> = OnceLock::new();

    let package_re = PACKAGE_RE
        .get_or_init(|| Regex::new(r"\bpackage\s+([\w$]+(?:\s*\.\s*[\w$]+)*)\s*;").unwrap());
    let import_re = IMPORT_RE.get_or_init(|| Regex::new(r"\bimport\s+[^;{}]+;").unwrap());
    let class_re = CLASS_RE.get_or_init(|| {
        Regex::new(r"\b(class|interface|enum|record)\s+([A-Za-z_$][\w$]*)([^{};]*)\{").unwrap()
    });

    let code = blank_non_code(source);
    let depth = brace_depths(&code);
    let mut meta = FileMetadata::new(path);

    meta.package = package_re
        .captures(&code)
        .map(|c| c[1].chars().filter(|ch| !ch.is_whitespace()).collect());

    let mut headers = Vec::new();
    for m in import_re.find_iter(&code) {
        if let Some(import) = Import::parse(m.as_str()) {
            meta.imports.push(import);
        }
        headers.push(m.range());
    }
    if let Some(m) = package_re.find(&code) {
        headers.push(m.range());
    }

    for caps in class_re.captures_iter(&code) {
        let (Some(whole), Some(keyword), Some(name), Some(header)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        // `Foo.class` and the like are not declarations.
        if code[..keyword.start()].trim_end().ends_with('.') {
            continue;
        }
        let Some(kind) = ClassKind::from_keyword(keyword.as_str()) else {
            continue;
        };

        let mut class = ClassMetadata::new(name.as_str(), kind);
        let open = whole.end() - 1;
        let close = matching_brace(&code, open);
        let start = declaration_start(&code, keyword.start());
        class.span = close.map(|end| span(source, start, end));
        if close.is_none() {
            tracing::debug!(
                path = %path.display(),
                class = name.as_str(),
                "unbalanced braces, class span unknown"
            );
        }
        parse_header(header.as_str(), kind, &mut class);

        let body_end = close.unwrap_or(code.len());
        let member_depth = depth[open] + 1;
        collect_fields(&code, &depth, open + 1..body_end, member_depth, &mut class);
        collect_methods(source, &code, &depth, open + 1..body_end, member_depth, &mut class);

        meta.classes.insert(class.simple_name.clone(), class);
    }

    meta.file_level_calls = call_chains(&code, &headers);
    meta
}

/// `depth[i]` is the number of unclosed `{` before byte `i`.
fn brace_depths(code: &str) -> Vec<usize> {
    let mut out = Vec::with_capacity(code.len() + 1);
    let mut depth = 0usize;
    for &b in code.as_bytes() {
        out.push(depth);
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    out.push(depth);
    out
}

/// Move a declaration start back over modifiers and annotations on the same
/// line, so spans start where the tree extractor's would.
fn declaration_start(code: &str, keyword: usize) -> usize {
    let line_start = code[..keyword].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &code[line_start..keyword];
    let is_modifiers = prefix.chars().all(|c| {
        c.is_alphanumeric()
            || c.is_whitespace()
            || matches!(c, '@' | '_' | '$' | '<' | '>' | ',' | '.' | '[' | ']' | '?')
    });
    if !is_modifiers {
        return keyword;
    }
    line_start + (prefix.len() - prefix.trim_start().len())
}

fn span(source: &str, start: usize, end: usize) -> Span {
    Span {
        start_byte: start,
        end_byte: end,
        start_line: line_at(source, start),
        end_line: line_at(source, end.saturating_sub(1)),
    }
}

/// Parse `extends A<B> implements C, D` from a class header.
fn parse_header(header: &str, kind: ClassKind, class: &mut ClassMetadata) {
    static EXTENDS_RE: OnceLock<Regex> = OnceLock::new();
    static IMPLEMENTS_RE: OnceLock<Regex> = OnceLock::new();

    let extends_re = EXTENDS_RE.get_or_init(|| {
        Regex::new(r"\bextends\s+(.+?)(?:\bimplements\b|\bpermits\b|$)").unwrap()
    });
    let implements_re = IMPLEMENTS_RE
        .get_or_init(|| Regex::new(r"\bimplements\s+(.+?)(?:\bpermits\b|$)").unwrap());

    let header = header.split_whitespace().collect::<Vec<_>>().join(" ");
    let header = skip_type_parameters(&header);
    // Record components.
    let header = header.rsplit_once(')').map_or(header, |(_, rest)| rest);

    if let Some(caps) = extends_re.captures(header) {
        class.supertypes.extend(split_types(&caps[1]));
    }
    if let Some(caps) = implements_re.captures(header) {
        let names = split_types(&caps[1]);
        if kind == ClassKind::Interface {
            class.supertypes.extend(names);
        } else {
            class.interfaces.extend(names);
        }
    }
}

/// Strip a leading `<T extends Foo<T>>` parameter list.
fn skip_type_parameters(header: &str) -> &str {
    let trimmed = header.trim_start();
    if !trimmed.starts_with('<') {
        return header;
    }
    let mut angle = 0usize;
    for (i, c) in trimmed.char_indices() {
        match c {
            '<' => angle += 1,
            '>' => {
                angle = angle.saturating_sub(1);
                if angle == 0 {
                    return &trimmed[i + 1..];
                }
            }
            _ => {}
        }
    }
    header
}

/// Split a comma-separated type list at top level (commas inside `<>` stay).
fn split_types(list: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut angle = 0usize;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            ',' if angle == 0 => {
                out.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    out.push(current);
    out.iter()
        .map(|t| type_simple_name(t))
        .filter(|t| !t.is_empty())
        .collect()
}

fn collect_fields(
    code: &str,
    depth: &[usize],
    range: std::ops::Range<usize>,
    member_depth: usize,
    class: &mut ClassMetadata,
) {
    let offset = range.start;
    for (name, ty, at) in typed_declarations(&code[range]) {
        if depth[offset + at] == member_depth {
            class.fields.insert(name, ty);
        }
    }
}

fn collect_methods(
    source: &str,
    code: &str,
    depth: &[usize],
    range: std::ops::Range<usize>,
    member_depth: usize,
    class: &mut ClassMetadata,
) {
    static METHOD_RE: OnceLock<Regex> = OnceLock::new();
    let method_re = METHOD_RE.get_or_init(|| {
        Regex::new(
            r"(?:([\w$<>\[\],.?]+)\s+)?([A-Za-z_$][\w$]*)\s*\(([^()]*)\)\s*(?:throws\s+[\w$.,\s]+?)?\s*\{",
        )
        .unwrap()
    });

    let offset = range.start;
    let body = &code[range];
    for caps in method_re.captures_iter(body) {
        let (Some(whole), Some(name), Some(params)) = (caps.get(0), caps.get(2), caps.get(3))
        else {
            continue;
        };
        // Without a return type or modifier only a constructor qualifies.
        let lead_ok = match caps.get(1) {
            Some(lead) => !CONTROL_KEYWORDS.contains(&lead.as_str()),
            None => name.as_str() == class.simple_name,
        };
        let at = offset + whole.start();
        if depth[at] != member_depth || !lead_ok || CONTROL_KEYWORDS.contains(&name.as_str()) {
            continue;
        }

        let open = offset + whole.end() - 1;
        let Some(end) = matching_brace(code, open) else {
            continue;
        };
        let start = declaration_start(code, at);
        let mut method = MethodMetadata {
            span: Some(span(source, start, end)),
            raw_body_text: source.get(start..end).unwrap_or_default().to_string(),
            ..MethodMetadata::default()
        };
        bind_params(params.as_str(), &mut method);
        for (local, ty, _) in typed_declarations(&code[open..end]) {
            method.locals.insert(local, ty);
        }
        class.insert_method(name.as_str(), method);
    }
}

/// Parameter list `final Foo a, List<Bar> b, Baz... rest`.
fn bind_params(params: &str, method: &mut MethodMetadata) {
    let params = params.trim();
    if params.is_empty() {
        return;
    }
    let mut angle = 0usize;
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            ',' if angle == 0 => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[start..]);

    for part in parts {
        method.arity += 1;
        let tokens: Vec<&str> = part
            .split_whitespace()
            .filter(|t| *t != "final" && !t.starts_with('@'))
            .collect();
        if let [.., ty, name] = tokens.as_slice() {
            let ty = type_simple_name(ty);
            if !ty.is_empty() {
                method.locals.insert((*name).to_string(), ty);
            }
        }
    }
}

/// `(name, type simple name, byte offset)` for each `Type name =|;|:` and
/// `var name = new Type(` in `code`.
fn typed_declarations(code: &str) -> Vec<(String, String, usize)> {
    static DECL_RE: OnceLock<Regex> = OnceLock::new();
    static VAR_RE: OnceLock<Regex> = OnceLock::new();

    let decl_re = DECL_RE.get_or_init(|| {
        Regex::new(
            r"\b([A-Z][\w$]*(?:\s*\.\s*[A-Z][\w$]*)*(?:\s*<[^;=(){}]*>)?(?:\s*\[\s*\])*)\s+([a-z_$][\w$]*)\s*(?:=|;|:)",
        )
        .unwrap()
    });
    let var_re = VAR_RE.get_or_init(|| {
        Regex::new(r"\bvar\s+([A-Za-z_$][\w$]*)\s*=\s*new\s+([\w$.]+)").unwrap()
    });

    let mut out: Vec<(String, String, usize)> = decl_re
        .captures_iter(code)
        .filter_map(|c| {
            let at = c.get(0)?.start();
            Some((c[2].to_string(), type_simple_name(&c[1]), at))
        })
        .collect();
    out.extend(var_re.captures_iter(code).filter_map(|c| {
        let at = c.get(0)?.start();
        Some((c[1].to_string(), type_simple_name(&c[2]), at))
    }));
    out.sort_by_key(|(_, _, at)| *at);
    out
}

/// Dotted chains (`a.b.c`) anywhere outside package and import declarations.
fn call_chains(code: &str, skip: &[std::ops::Range<usize>]) -> Vec<String> {
    static CHAIN_RE: OnceLock<Regex> = OnceLock::new();
    let chain_re = CHAIN_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*)+").unwrap()
    });

    chain_re
        .find_iter(code)
        .filter(|m| !skip.iter().any(|r| r.contains(&m.start())))
        .map(|m| m.as_str().to_string())
        .collect()
}
