//! Python extractor using tree-sitter

use super::{field_text, node_text, LanguageExtractor};
use codescope_core::{CallEdge, ExtractionMode, SymbolFacts};
use tree_sitter::{Node, Tree};

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, tree: &Tree, source: &str) -> SymbolFacts {
        let mut walker = Walker {
            source,
            facts: SymbolFacts::empty(ExtractionMode::Structured),
        };
        walker.visit(tree.root_node(), None);
        walker.facts
    }
}

struct Walker<'a> {
    source: &'a str,
    facts: SymbolFacts,
}

impl<'a> Walker<'a> {
    /// `scope` is the innermost enclosing function or class name.
    fn visit(&mut self, node: Node, scope: Option<&str>) {
        match node.kind() {
            "function_definition" => {
                if let Some(name) = field_text(node, "name", self.source) {
                    self.facts.functions.push(name.to_string());
                    self.visit_children(node, Some(name));
                    return;
                }
            }
            "class_definition" => {
                // Statements directly in a class body are attributed to the class.
                if let Some(name) = field_text(node, "name", self.source) {
                    self.facts.classes.push(name.to_string());
                    self.visit_children(node, Some(name));
                    return;
                }
            }
            "call" => {
                let callee = node
                    .child_by_field_name("function")
                    .filter(|f| f.kind() == "identifier")
                    .and_then(|f| node_text(f, self.source));
                if let (Some(caller), Some(callee)) = (scope, callee) {
                    self.facts.edges.push(CallEdge::new(caller, callee));
                }
            }
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    if let Some(module) = self.imported_name(name) {
                        self.facts.imports.push(module);
                    }
                }
                return;
            }
            "import_from_statement" => {
                self.import_from(node);
                return;
            }
            _ => {}
        }

        self.visit_children(node, scope);
    }

    fn visit_children(&mut self, node: Node, scope: Option<&str>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, scope);
        }
    }

    /// `a.b` or the original name of `a.b as c`.
    fn imported_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "aliased_import" => field_text(node, "name", self.source).map(str::to_string),
            _ => node_text(node, self.source).map(str::to_string),
        }
    }

    /// `from m import a, b` yields `m.a` and `m.b`; relative dots are dropped.
    fn import_from(&mut self, node: Node) {
        let module = field_text(node, "module_name", self.source)
            .map(|m| m.trim_start_matches('.'))
            .unwrap_or("");

        let mut cursor = node.walk();
        let mut names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|n| self.imported_name(n))
            .collect();

        let mut cursor = node.walk();
        if node
            .children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        for name in names {
            self.facts.imports.push(format!("{}.{}", module, name));
        }
    }
}
