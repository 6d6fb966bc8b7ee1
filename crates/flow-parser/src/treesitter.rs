//! Tree-sitter integration for Java AST parsing.

use anyhow::{Context, Result};
use flow_core::model::Span;
use std::path::Path;
use tree_sitter::Node;

/// Parse a source file and return the tree-sitter tree.
pub fn parse_file(
    path: &Path,
    source: &[u8],
    language: &tree_sitter::Language,
) -> Result<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(language)
        .context("failed to set tree-sitter language")?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse {}", path.display()))
}

/// Source text covered by `node`.
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Byte range and 1-based inclusive line range of `node`.
pub fn node_span(node: &Node) -> Span {
    Span {
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
    }
}

/// Declared name of `node`: the `name` field, else the first identifier child.
pub fn declared_name(node: &Node, source: &str) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(&name, source).to_string());
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")
        .map(|c| node_text(&c, source).to_string())
}
