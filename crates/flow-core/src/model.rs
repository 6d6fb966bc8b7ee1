//! Per-file metadata model produced by the extractors.
//!
//! A [`FileMetadata`] is built once per source file and never mutated after
//! the extractor returns it. Everything downstream (symbol index, graph,
//! ordering, snippets) reads these records by reference.

use crate::graph::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Sentinel key for methods whose name could not be recovered.
pub const ANONYMOUS_METHOD: &str = "<anonymous>";

/// Byte and line range of a node in its source file.
///
/// Lines are 1-based and inclusive; bytes are a half-open range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    /// Slice `source` by this span. Returns `None` if the span is out of range
    /// or does not fall on char boundaries.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start_byte..self.end_byte)
    }
}

/// A single `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Import {
    /// Dotted path without the trailing `.*` (e.g. `com.example.service`).
    pub path: String,
    /// `import a.b.*;`
    pub wildcard: bool,
    /// `import static ...;`
    pub is_static: bool,
}

impl Import {
    /// Parse the text of an import declaration (`import static a.b.C;`).
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.trim().strip_prefix("import")?.trim_start();
        let (is_static, body) = match body.strip_prefix("static") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim_start()),
            _ => (false, body),
        };
        let body: String = body
            .trim_end()
            .trim_end_matches(';')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let (path, wildcard) = match body.strip_suffix(".*") {
            Some(pkg) => (pkg.to_string(), true),
            None => (body, false),
        };
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path,
            wildcard,
            is_static,
        })
    }

    /// Last segment of an exact import (`com.x.Foo` -> `Foo`).
    pub fn simple_name(&self) -> Option<&str> {
        if self.wildcard {
            return None;
        }
        self.path.rsplit('.').next()
    }

    /// Package part of an exact import (`com.x.Foo` -> `com.x`).
    pub fn package(&self) -> &str {
        if self.wildcard {
            return &self.path;
        }
        self.path.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("import ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str(&self.path)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        f.write_str(";")
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
}

impl ClassKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(Self::Class),
            "interface" => Some(Self::Interface),
            "enum" => Some(Self::Enum),
            "record" => Some(Self::Record),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
        }
    }
}

/// A source file read from disk, path relative to the project root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    /// Simple class name -> class. Keys are unique within one file.
    pub classes: BTreeMap<String, ClassMetadata>,
    /// Raw call-like texts found anywhere in the file.
    pub file_level_calls: Vec<String>,
}

impl FileMetadata {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Package name, empty for the default package.
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }

    /// Classes in source order. Classes without a span sort last, by name.
    pub fn classes_in_order(&self) -> Vec<&ClassMetadata> {
        let mut classes: Vec<&ClassMetadata> = self.classes.values().collect();
        classes.sort_by_key(|c| c.span.map_or(usize::MAX, |s| s.start_byte));
        classes
    }
}

/// A class, interface, enum, or record declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub simple_name: String,
    pub kind: ClassKind,
    pub span: Option<Span>,
    /// Simple names this class extends.
    pub supertypes: Vec<String>,
    /// Simple names this class implements.
    pub interfaces: Vec<String>,
    /// Field name -> declared type simple name.
    pub fields: BTreeMap<String, String>,
    /// Method key -> method. See [`ClassMetadata::insert_method`].
    pub methods: BTreeMap<String, MethodMetadata>,
    /// Declaration order of `methods` keys.
    pub method_order: Vec<String>,
}

impl ClassMetadata {
    pub fn new(simple_name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            simple_name: simple_name.into(),
            kind,
            span: None,
            supertypes: Vec::new(),
            interfaces: Vec::new(),
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
            method_order: Vec::new(),
        }
    }

    /// Insert a method without overwriting overloads.
    ///
    /// The first declaration of a name is keyed by the bare name, later ones
    /// by `name#2`, `name#3`, ... Empty names use [`ANONYMOUS_METHOD`].
    /// Returns the key actually used.
    pub fn insert_method(&mut self, name: &str, method: MethodMetadata) -> String {
        let base = if name.is_empty() {
            ANONYMOUS_METHOD
        } else {
            name
        };
        let mut key = base.to_string();
        let mut n = 1;
        while self.methods.contains_key(&key) {
            n += 1;
            key = format!("{}#{}", base, n);
        }
        self.methods.insert(key.clone(), method);
        self.method_order.push(key.clone());
        key
    }

    /// Methods in declaration order.
    pub fn methods_in_order(&self) -> impl Iterator<Item = (&str, &MethodMetadata)> {
        self.method_order
            .iter()
            .filter_map(|k| self.methods.get(k).map(|m| (k.as_str(), m)))
    }

    /// Supertypes followed by interfaces.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.supertypes
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }
}

/// A method or constructor declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub span: Option<Span>,
    pub arity: usize,
    /// Local variable (and parameter) name -> declared type simple name.
    pub locals: BTreeMap<String, String>,
    /// Method text used for call-token scanning.
    pub raw_body_text: String,
}

/// Where a registered class was declared.
#[derive(Debug, Clone, Copy)]
pub struct ClassRecord<'a> {
    pub file: &'a FileMetadata,
    pub class: &'a ClassMetadata,
}

/// Qualified identity -> declaration. When two files declare the same
/// identity the later one is kept.
pub type ClassRegistry<'a> = BTreeMap<ClassId, ClassRecord<'a>>;

/// Reduce a declared type to its simple name.
///
/// `java.util.List<Foo>[]` -> `List`, `Map.Entry<K, V>` -> `Entry`.
pub fn type_simple_name(declared: &str) -> String {
    let base = declared.split('<').next().unwrap_or(declared);
    let base = base.trim().trim_end_matches("...").trim_end_matches("[]").trim();
    base.rsplit('.').next().unwrap_or(base).trim().to_string()
}
