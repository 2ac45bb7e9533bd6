//! Composition of per-file graphs, derived metrics and the output bundle

use crate::graph::CodeGraph;
use crate::model::{AnalysisResult, EdgeKind, NodeKind, SymbolFacts};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to write output {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize output bundle: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A name with its count, used for ranked metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub count: usize,
}

/// Metrics derived from the combined graphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    /// Structure graph node count per type.
    pub node_counts: BTreeMap<NodeKind, usize>,
    /// Files ranked by connection degree.
    pub most_connected_files: Vec<RankedEntry>,
    /// Imports ranked by the number of files importing them.
    pub top_imports: Vec<RankedEntry>,
    /// Symbols ranked by incoming call edges.
    pub most_called: Vec<RankedEntry>,
    pub call_graph_nodes: usize,
    pub call_graph_edges: usize,
}

/// Sole owner of the combined graphs while a run is being assembled.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    structure: CodeGraph,
    calls: CodeGraph,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build both per-file graphs from extracted facts and union them in.
    pub fn add_file(&mut self, file_path: &str, facts: &SymbolFacts) {
        self.compose(
            &CodeGraph::structure_of(file_path, facts),
            &CodeGraph::calls_of(facts),
        );
    }

    /// Union already-built per-file graphs into the combined ones.
    pub fn compose(&mut self, structure: &CodeGraph, calls: &CodeGraph) {
        self.structure.compose(structure);
        self.calls.compose(calls);
    }

    pub fn structure_graph(&self) -> &CodeGraph {
        &self.structure
    }

    pub fn call_graph(&self) -> &CodeGraph {
        &self.calls
    }

    /// Derived metrics; ranked lists hold at most `limit` entries.
    pub fn metrics(&self, limit: usize) -> GraphMetrics {
        let mut node_counts = BTreeMap::new();
        for node in self.structure.all_nodes() {
            *node_counts.entry(node.kind).or_insert(0) += 1;
        }

        let most_connected_files = ranked(
            self.structure
                .nodes_of_kind(NodeKind::File)
                .map(|n| (n.name.clone(), self.structure.degree(&n.name))),
            limit,
        );
        let top_imports = ranked(
            self.structure
                .nodes_of_kind(NodeKind::Import)
                .map(|n| (n.name.clone(), self.structure.in_degree(&n.name, EdgeKind::Imports))),
            limit,
        );
        let most_called = ranked(
            self.calls
                .all_nodes()
                .map(|n| (n.name.clone(), self.calls.in_degree(&n.name, EdgeKind::Calls)))
                .filter(|(_, count)| *count > 0),
            limit,
        );

        GraphMetrics {
            node_counts,
            most_connected_files,
            top_imports,
            most_called,
            call_graph_nodes: self.calls.node_count(),
            call_graph_edges: self.calls.edge_count(),
        }
    }

    /// Textual summary of the call graph handed to the call-graph analysis.
    pub fn call_graph_summary(&self, top: usize) -> String {
        let mut summary = format!(
            "The call graph contains {} symbols and {} calls between them.\nMost called symbols:\n",
            self.calls.node_count(),
            self.calls.edge_count()
        );
        for entry in self.metrics(top).most_called {
            summary.push_str(&format!("{}: {} calls\n", entry.name, entry.count));
        }
        summary
    }

    /// Assemble the final bundle. File analyses are ordered by path.
    pub fn into_bundle(
        self,
        global_analysis: String,
        call_graph_analysis: String,
        mut file_analyses: Vec<AnalysisResult>,
        metrics_limit: usize,
    ) -> AnalysisBundle {
        file_analyses.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        let metrics = self.metrics(metrics_limit);
        AnalysisBundle {
            global_analysis,
            call_graph_analysis,
            file_analyses,
            call_graph: self.calls,
            code_graph: self.structure,
            metrics,
        }
    }
}

/// Sort by count descending, then name, and keep the first `limit`.
fn ranked(items: impl Iterator<Item = (String, usize)>, limit: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = items
        .map(|(name, count)| RankedEntry { name, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(limit);
    entries
}

/// Everything a run produces, as handed to rendering collaborators.
#[derive(Debug, Serialize)]
pub struct AnalysisBundle {
    pub global_analysis: String,
    pub call_graph_analysis: String,
    pub file_analyses: Vec<AnalysisResult>,
    pub call_graph: CodeGraph,
    pub code_graph: CodeGraph,
    pub metrics: GraphMetrics,
}

impl AnalysisBundle {
    pub fn to_json(&self) -> Result<String, BundleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the bundle as pretty JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), BundleError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
