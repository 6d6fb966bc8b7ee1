//! Tree-sitter Java metadata extractor.
//!
//! Walks the whole syntax tree once. Every class-like declaration (including
//! nested and local ones) becomes its own [`ClassMetadata`]; its fields and
//! methods are taken only from its own body, so members of a nested class are
//! never attributed to the enclosing one.

use crate::MetadataProducer;
use crate::treesitter::{declared_name, node_span, node_text, parse_file};
use flow_core::error::FlowError;
use flow_core::model::{
    ClassKind, ClassMetadata, FileMetadata, Import, MethodMetadata, type_simple_name,
};
use std::collections::BTreeMap;
use std::path::Path;
use tree_sitter::Node;

/// Metadata producer backed by the tree-sitter Java grammar.
pub struct JavaTreeExtractor {
    language: tree_sitter::Language,
}

impl JavaTreeExtractor {
    /// Load the grammar, failing if this tree-sitter build cannot use it.
    pub fn new() -> Result<Self, FlowError> {
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| FlowError::Grammar(e.to_string()))?;
        Ok(Self { language })
    }
}

impl MetadataProducer for JavaTreeExtractor {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    fn extract(&self, path: &Path, source: &str) -> Result<FileMetadata, FlowError> {
        let tree = parse_file(path, source.as_bytes(), &self.language)
            .map_err(|e| FlowError::parse(path, format!("{:#}", e)))?;
        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(
                path = %path.display(),
                "syntax errors in file, keeping the declarations that parsed"
            );
        }

        let mut meta = FileMetadata::new(path);
        walk(&root, source, &mut meta);
        Ok(meta)
    }
}

fn walk(node: &Node, source: &str, meta: &mut FileMetadata) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "package_declaration" => {
                if meta.package.is_none() {
                    meta.package = package_name(&child, source);
                }
                continue;
            }
            "import_declaration" => {
                if let Some(import) = Import::parse(node_text(&child, source)) {
                    meta.imports.push(import);
                }
                continue;
            }
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" => {
                if let Some(class) = extract_class(&child, source) {
                    if meta.classes.contains_key(&class.simple_name) {
                        tracing::debug!(
                            path = %meta.path.display(),
                            class = %class.simple_name,
                            "class declared twice in one file, keeping the later one"
                        );
                    }
                    meta.classes.insert(class.simple_name.clone(), class);
                }
            }
            "method_invocation" | "field_access" => {
                meta.file_level_calls
                    .push(node_text(&child, source).to_string());
            }
            _ => {}
        }
        walk(&child, source, meta);
    }
}

fn package_name(node: &Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
        .map(|c| {
            node_text(&c, source)
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect()
        })
}

fn extract_class(node: &Node, source: &str) -> Option<ClassMetadata> {
    let kind = ClassKind::from_keyword(node.kind().trim_end_matches("_declaration"))?;
    let Some(name) = declared_name(node, source) else {
        tracing::debug!(line = node.start_position().row + 1, "unnamed class declaration");
        return None;
    };

    let mut class = ClassMetadata::new(name, kind);
    class.span = Some(node_span(node));

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "superclass" => class.supertypes.extend(type_names(&child, source)),
            // Interfaces extend other interfaces; that is a supertype link.
            "extends_interfaces" => class.supertypes.extend(type_names(&child, source)),
            "super_interfaces" => class.interfaces.extend(type_names(&child, source)),
            _ => {}
        }
    }

    let Some(body) = node.child_by_field_name("body") else {
        return Some(class);
    };
    for member in members(&body) {
        match member.kind() {
            "field_declaration" | "constant_declaration" => {
                collect_declarators(&member, source, &mut class.fields);
            }
            "method_declaration" | "constructor_declaration" => {
                let name = declared_name(&member, source).unwrap_or_default();
                class.insert_method(&name, extract_method(&member, source));
            }
            "compact_constructor_declaration" => {
                let name = class.simple_name.clone();
                class.insert_method(&name, extract_method(&member, source));
            }
            _ => {}
        }
    }
    Some(class)
}

/// Direct members of a class body. Enum members after the constant list live
/// one level down, in `enum_body_declarations`.
fn members<'t>(body: &Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            out.extend(child.named_children(&mut inner));
        } else {
            out.push(child);
        }
    }
    out
}

/// Simple names of the types listed under a `superclass`, `super_interfaces`
/// or `extends_interfaces` node.
fn type_names(node: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "type_list" => names.extend(type_names(&child, source)),
            "type_identifier" | "scoped_type_identifier" | "generic_type" => {
                let name = type_simple_name(node_text(&child, source));
                if !name.is_empty() {
                    names.push(name);
                }
            }
            _ => {}
        }
    }
    names
}

fn extract_method(node: &Node, source: &str) -> MethodMetadata {
    let mut method = MethodMetadata {
        span: Some(node_span(node)),
        raw_body_text: node_text(node, source).to_string(),
        ..MethodMetadata::default()
    };

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "formal_parameter" => {
                    method.arity += 1;
                    bind(&param, "type", source, &mut method.locals);
                }
                "spread_parameter" => {
                    method.arity += 1;
                    bind_spread(&param, source, &mut method.locals);
                }
                _ => {}
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        collect_locals(&body, source, &mut method.locals);
    }
    method
}

fn collect_locals(node: &Node, source: &str, locals: &mut BTreeMap<String, String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "local_variable_declaration" => collect_declarators(&child, source, locals),
            "enhanced_for_statement" | "resource" => bind(&child, "type", source, locals),
            "catch_formal_parameter" => {
                let mut inner = child.walk();
                let ty = child
                    .named_children(&mut inner)
                    .find(|c| c.kind() == "catch_type")
                    .map(|c| node_text(&c, source));
                if let (Some(ty), Some(name)) = (ty, child.child_by_field_name("name")) {
                    // Multi-catch binds the first alternative.
                    let first = ty.split('|').next().unwrap_or(ty);
                    locals.insert(
                        node_text(&name, source).to_string(),
                        type_simple_name(first),
                    );
                }
            }
            _ => {}
        }
        collect_locals(&child, source, locals);
    }
}

/// Bind every `variable_declarator` of a field or local declaration to the
/// declared type. `var` takes its type from a `new T(...)` initializer.
fn collect_declarators(node: &Node, source: &str, into: &mut BTreeMap<String, String>) {
    let Some(ty) = node.child_by_field_name("type") else {
        return;
    };
    let declared = node_text(&ty, source);

    let mut cursor = node.walk();
    for decl in node.named_children(&mut cursor) {
        if decl.kind() != "variable_declarator" {
            continue;
        }
        let Some(name) = decl.child_by_field_name("name") else {
            continue;
        };
        let ty = if declared == "var" {
            decl.child_by_field_name("value")
                .filter(|v| v.kind() == "object_creation_expression")
                .and_then(|v| v.child_by_field_name("type"))
                .map(|t| type_simple_name(node_text(&t, source)))
        } else {
            Some(type_simple_name(declared))
        };
        if let Some(ty) = ty.filter(|t| !t.is_empty()) {
            into.insert(node_text(&name, source).to_string(), ty);
        }
    }
}

fn bind(node: &Node, type_field: &str, source: &str, into: &mut BTreeMap<String, String>) {
    let (Some(ty), Some(name)) = (
        node.child_by_field_name(type_field),
        node.child_by_field_name("name"),
    ) else {
        return;
    };
    let ty = type_simple_name(node_text(&ty, source));
    if !ty.is_empty() && ty != "var" {
        into.insert(node_text(&name, source).to_string(), ty);
    }
}

/// `Foo... rest`: the grammar gives no fields here, so take the first type
/// child and the declarator's name.
fn bind_spread(node: &Node, source: &str, into: &mut BTreeMap<String, String>) {
    let mut cursor = node.walk();
    let mut ty = None;
    let mut name = None;
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "modifiers" => {}
            "variable_declarator" => {
                name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, source).to_string());
            }
            _ if ty.is_none() => ty = Some(type_simple_name(node_text(&child, source))),
            _ => {}
        }
    }
    if let (Some(ty), Some(name)) = (ty, name) {
        into.insert(name, ty);
    }
}
