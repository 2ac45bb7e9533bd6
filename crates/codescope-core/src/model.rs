//! Core data structures shared by the extractor, the inference client and the aggregator

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Discriminates what kind of code entity a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Import,
    Function,
    Class,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Import => "import",
            NodeKind::Function => "function",
            NodeKind::Class => "class",
        }
    }
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// File declares a function or class.
    Contains,
    /// File imports a module or name.
    Imports,
    /// Lexical call from one symbol to another.
    Calls,
}

/// A single node in a code graph. Identity is the qualified `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub kind: NodeKind,
}

/// A directed (caller, callee) pair found by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

/// How a file's symbols were recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Walked a syntax tree. Edges are available.
    Structured,
    /// Pattern matching over raw text. Names only, no edges.
    Heuristic,
}

/// Structural facts about one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFacts {
    pub mode: ExtractionMode,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub edges: Vec<CallEdge>,
}

impl SymbolFacts {
    pub fn empty(mode: ExtractionMode) -> Self {
        Self {
            mode,
            imports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }
}

/// Analysis of one file, either served from cache or freshly computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_path: String,
    pub file_type: String,
    pub analysis: String,
    /// Chunks whose call failed and were replaced by an inline note.
    #[serde(skip)]
    pub failed_chunks: usize,
}

impl AnalysisResult {
    pub fn new(file_path: impl Into<String>, file_type: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            file_type: file_type.into(),
            analysis: analysis.into(),
            failed_chunks: 0,
        }
    }

    /// True when every chunk produced a real analysis.
    pub fn is_complete(&self) -> bool {
        self.failed_chunks == 0
    }
}

/// Human-readable file type label derived from the extension.
pub fn file_type_label(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("py") => "Python",
        Some("js") => "JavaScript",
        Some("ts") => "TypeScript",
        Some("cpp") => "C++",
        Some("c") => "C",
        Some("h") => "C/C++ Header",
        Some("hpp") => "C++ Header",
        Some("java") => "Java",
        Some("cs") => "C#",
        Some("html") => "HTML",
        Some("css") => "CSS",
        Some("php") => "PHP",
        Some("rb") => "Ruby",
        Some("go") => "Go",
        Some("rs") => "Rust",
        Some("swift") => "Swift",
        Some("kt") => "Kotlin",
        Some("scala") => "Scala",
        Some("m") => "Objective-C",
        Some("mm") => "Objective-C++",
        Some("pl") => "Perl",
        Some("sh") => "Shell Script",
        Some("sql") => "SQL",
        Some("xml") => "XML",
        Some("json") => "JSON",
        Some("yaml") | Some("yml") => "YAML",
        Some("md") => "Markdown",
        Some("txt") => "Plain Text",
        _ => "Unknown",
    }
}
