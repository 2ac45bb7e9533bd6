//! JavaScript extractor using tree-sitter

use super::{field_text, node_text, LanguageExtractor};
use codescope_core::{CallEdge, ExtractionMode, SymbolFacts};
use tree_sitter::{Node, Tree};

pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
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

fn is_function_value(node: Node) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

impl<'a> Walker<'a> {
    fn visit(&mut self, node: Node, scope: Option<&str>) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                if let Some(name) = field_text(node, "name", self.source) {
                    self.facts.functions.push(name.to_string());
                    self.visit_children(node, Some(name));
                    return;
                }
            }
            "class_declaration" | "class" => {
                if let Some(name) = field_text(node, "name", self.source) {
                    self.facts.classes.push(name.to_string());
                    self.visit_children(node, Some(name));
                    return;
                }
            }
            "variable_declarator" => {
                // const handler = () => { ... } names the function `handler`
                let value = node.child_by_field_name("value");
                let name = node
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                    .and_then(|n| node_text(n, self.source));
                if let (Some(value), Some(name)) = (value, name) {
                    if is_function_value(value) {
                        self.facts.functions.push(name.to_string());
                        self.visit(value, Some(name));
                        return;
                    }
                }
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .filter(|f| f.kind() == "identifier")
                    .and_then(|f| node_text(f, self.source));
                if callee == Some("require") {
                    if let Some(module) = self.first_string_argument(node) {
                        self.facts.imports.push(module);
                    }
                } else if let (Some(caller), Some(callee)) = (scope, callee) {
                    self.facts.edges.push(CallEdge::new(caller, callee));
                }
            }
            "new_expression" => {
                let callee = node
                    .child_by_field_name("constructor")
                    .filter(|f| f.kind() == "identifier")
                    .and_then(|f| node_text(f, self.source));
                if let (Some(caller), Some(callee)) = (scope, callee) {
                    self.facts.edges.push(CallEdge::new(caller, callee));
                }
            }
            "import_statement" => {
                if let Some(module) = field_text(node, "source", self.source) {
                    self.facts.imports.push(unquote(module));
                }
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

    fn first_string_argument(&self, call: Node) -> Option<String> {
        let arguments = call.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        let first = arguments
            .named_children(&mut cursor)
            .find(|a| a.kind() == "string")?;
        node_text(first, self.source).map(unquote)
    }
}
