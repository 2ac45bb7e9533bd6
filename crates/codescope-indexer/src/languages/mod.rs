//! Symbol extractors over parsed syntax trees, plus the text heuristic fallback

pub mod heuristic;
pub mod javascript;
pub mod python;

use crate::parser_pool::FileType;
use codescope_core::SymbolFacts;
use tree_sitter::{Node, Tree};

/// Walks a syntax tree and collects declarations, imports and call edges.
pub trait LanguageExtractor: Send + Sync {
    fn extract(&self, tree: &Tree, source: &str) -> SymbolFacts;
}

/// Get the structured extractor for a parsed file type
pub fn get_extractor(file_type: FileType) -> Box<dyn LanguageExtractor> {
    match file_type {
        FileType::Python => Box::new(python::PythonExtractor),
        FileType::JavaScript => Box::new(javascript::JavaScriptExtractor),
    }
}

pub(crate) fn node_text<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}

pub(crate) fn field_text<'a>(node: Node, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field)
        .and_then(|child| node_text(child, source))
}
