//! Test utilities for codescope-core

use crate::model::{CallEdge, ExtractionMode, SymbolFacts};

/// Facts for a file declaring `functions` with the given call edges.
pub fn facts(functions: &[&str], edges: &[(&str, &str)]) -> SymbolFacts {
    SymbolFacts {
        mode: ExtractionMode::Structured,
        imports: Vec::new(),
        functions: functions.iter().map(|f| f.to_string()).collect(),
        classes: Vec::new(),
        edges: edges.iter().map(|(a, b)| CallEdge::new(*a, *b)).collect(),
    }
}

/// Same as `facts` with imports and classes.
pub fn facts_with(
    imports: &[&str],
    functions: &[&str],
    classes: &[&str],
    edges: &[(&str, &str)],
) -> SymbolFacts {
    let mut f = facts(functions, edges);
    f.imports = imports.iter().map(|i| i.to_string()).collect();
    f.classes = classes.iter().map(|c| c.to_string()).collect();
    f
}
