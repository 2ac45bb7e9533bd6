//! Pattern-based fallback when no syntax tree is available
//!
//! Recovers approximate function, class and import names from raw text in any
//! language. No call edges are produced.

use codescope_core::{ExtractionMode, SymbolFacts};
use regex::Regex;
use std::sync::LazyLock;

static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:def|function|fn|func)\s+(\w+)").expect("valid function pattern")
});

static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:class|struct|interface)\s+(\w+)").expect("valid class pattern")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|from|using|use)\s+([\w.:]+)|^\s*#\s*include\s*[<"]([^>"]+)[>"]"#)
        .expect("valid import pattern")
});

fn captures(pattern: &Regex, content: &str) -> Vec<String> {
    pattern
        .captures_iter(content)
        .filter_map(|c| c.iter().skip(1).flatten().next())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract names by pattern matching over the raw text.
pub fn extract(content: &str) -> SymbolFacts {
    SymbolFacts {
        mode: ExtractionMode::Heuristic,
        imports: captures(&IMPORT, content),
        functions: captures(&FUNCTION, content),
        classes: captures(&CLASS, content),
        edges: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_names() {
        let facts = extract("#include <vector>\n#include \"util.h\"\nstruct Point { int x; };\nclass Shape {};\n");
        assert_eq!(facts.imports, vec!["vector", "util.h"]);
        assert_eq!(facts.classes, vec!["Point", "Shape"]);
        assert!(facts.edges.is_empty());
        assert_eq!(facts.mode, ExtractionMode::Heuristic);
    }

    #[test]
    fn test_java_and_python_names() {
        let facts = extract("import java.util.List;\npublic class App {}\n");
        assert_eq!(facts.imports, vec!["java.util.List"]);
        assert_eq!(facts.classes, vec!["App"]);

        let facts = extract("from os import path\ndef broken(:\n    pass\n");
        assert_eq!(facts.imports, vec!["os"]);
        assert_eq!(facts.functions, vec!["broken"]);
    }
}
