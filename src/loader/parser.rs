//! Tree-sitter parser integration for JavaScript/TypeScript modules
//!
//! Compiled `.js`/`.mjs` output is parsed with the JavaScript grammar;
//! `.ts`/`.mts` sources with the TypeScript grammar.

use super::LoadError;
use std::path::{Path, PathBuf};
use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleVariant {
    JavaScript,
    TypeScript,
    Tsx,
}

impl ModuleVariant {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }
}

/// Get the tree-sitter language for a module variant
fn get_language(variant: ModuleVariant) -> TsLanguage {
    match variant {
        ModuleVariant::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        ModuleVariant::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        ModuleVariant::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

pub struct ParsedSource {
    pub tree: Tree,
    pub source: String,
    pub path: PathBuf,
    pub variant: ModuleVariant,
}

/// Parse module source. A tree containing error nodes is rejected, the same
/// way a runtime refuses to import a module with a syntax error.
pub fn parse_source(
    content: &str,
    path: &Path,
    variant: ModuleVariant,
) -> Result<ParsedSource, LoadError> {
    let mut parser = Parser::new();
    let language = get_language(variant);

    parser
        .set_language(&language)
        .map_err(|e| LoadError::Parser {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| LoadError::Parser {
            path: path.to_path_buf(),
            message: "parser returned no tree".to_string(),
        })?;

    if let Some(error) = first_error(&tree.root_node()) {
        return Err(LoadError::Syntax {
            path: path.to_path_buf(),
            line: node_line(&error),
            column: node_column(&error),
        });
    }

    Ok(ParsedSource {
        tree,
        path: path.to_path_buf(),
        source: content.to_string(),
        variant,
    })
}

/// Determine module variant from file path
pub fn detect_variant(path: &Path) -> ModuleVariant {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ModuleVariant::from_extension)
        .unwrap_or(ModuleVariant::JavaScript)
}

/// First error or missing node in document order.
fn first_error<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children
        .iter()
        .find_map(|child| first_error(child))
        .or(Some(*node))
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get the column number for a tree-sitter node (1-indexed)
pub fn node_column(node: &Node) -> usize {
    node.start_position().column + 1
}
