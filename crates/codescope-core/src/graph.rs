//! Graph wrapper using petgraph::StableDiGraph keyed by qualified symbol name

use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A directed code graph. Nodes are unique per name; edges are unique per
/// (source, target, kind).
#[derive(Clone)]
pub struct CodeGraph {
    inner: StableDiGraph<GraphNode, EdgeKind>,
    index: HashMap<String, NodeIndex>,
}

impl std::fmt::Debug for CodeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl CodeGraph {
    pub fn new() -> Self {
        CodeGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Structure graph of one file: the file node, its declarations as
    /// `file::symbol` and its imports as bare names.
    pub fn structure_of(file_path: &str, facts: &SymbolFacts) -> Self {
        let mut graph = CodeGraph::new();
        graph.add_node(file_path, NodeKind::File);

        for import in &facts.imports {
            graph.link(file_path, import, NodeKind::Import, EdgeKind::Imports);
        }
        for function in &facts.functions {
            let qualified = format!("{}::{}", file_path, function);
            graph.link(file_path, &qualified, NodeKind::Function, EdgeKind::Contains);
        }
        for class in &facts.classes {
            let qualified = format!("{}::{}", file_path, class);
            graph.link(file_path, &qualified, NodeKind::Class, EdgeKind::Contains);
        }

        graph
    }

    /// Call graph of one file over bare symbol names.
    pub fn calls_of(facts: &SymbolFacts) -> Self {
        let mut graph = CodeGraph::new();

        for function in &facts.functions {
            graph.add_node(function, NodeKind::Function);
        }
        for class in &facts.classes {
            graph.add_node(class, NodeKind::Class);
        }
        for edge in &facts.edges {
            let caller_kind = if facts.is_class(&edge.caller) {
                NodeKind::Class
            } else {
                NodeKind::Function
            };
            let callee_kind = if facts.is_class(&edge.callee) {
                NodeKind::Class
            } else {
                NodeKind::Function
            };
            let source = graph.add_node(&edge.caller, caller_kind);
            let target = graph.add_node(&edge.callee, callee_kind);
            graph.add_edge(source, target, EdgeKind::Calls);
        }

        graph
    }

    /// Add a node or return the existing one with the same name.
    /// A `Function` node is upgraded when the same name is seen as a `Class`.
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            if let Some(node) = self.inner.node_weight_mut(idx) {
                if node.kind == NodeKind::Function && kind == NodeKind::Class {
                    node.kind = NodeKind::Class;
                }
            }
            return idx;
        }

        let idx = self.inner.add_node(GraphNode {
            name: name.to_string(),
            kind,
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Add an edge unless an identical one exists. Returns true if added.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) -> bool {
        if self.connected(source, target, kind) {
            return false;
        }
        self.inner.add_edge(source, target, kind);
        true
    }

    fn connected(&self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) -> bool {
        self.inner
            .edges_directed(source, Direction::Outgoing)
            .any(|e| e.target() == target && *e.weight() == kind)
    }

    fn link(&mut self, source: &str, target: &str, target_kind: NodeKind, kind: EdgeKind) {
        let source = self.index.get(source).copied();
        if let Some(source) = source {
            let target = self.add_node(target, target_kind);
            self.add_edge(source, target, kind);
        }
    }

    /// Union of nodes and edges. Nothing is removed.
    pub fn compose(&mut self, other: &CodeGraph) {
        for node in other.all_nodes() {
            self.add_node(&node.name, node.kind);
        }
        for (source, target, kind) in other.edges() {
            let source = self.add_node(&source.name, source.kind);
            let target = self.add_node(&target.name, target.kind);
            self.add_edge(source, target, kind);
        }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.index
            .get(name)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Check if an edge of a given kind exists between two named nodes.
    pub fn has_edge(&self, source: &str, target: &str, kind: EdgeKind) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&s), Some(&t)) => self.connected(s, t, kind),
            _ => false,
        }
    }

    /// Iterate over all nodes.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges as (source, target, kind).
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, EdgeKind)> {
        self.inner.edge_references().filter_map(move |e| {
            let source = self.inner.node_weight(e.source())?;
            let target = self.inner.node_weight(e.target())?;
            Some((source, target, *e.weight()))
        })
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> + '_ {
        self.all_nodes().filter(move |n| n.kind == kind)
    }

    /// In-degree plus out-degree.
    pub fn degree(&self, name: &str) -> usize {
        self.index.get(name).map_or(0, |&idx| {
            self.inner.edges_directed(idx, Direction::Incoming).count()
                + self.inner.edges_directed(idx, Direction::Outgoing).count()
        })
    }

    /// Number of incoming edges of the given kind.
    pub fn in_degree(&self, name: &str, kind: EdgeKind) -> usize {
        self.index.get(name).map_or(0, |&idx| {
            self.inner
                .edges_directed(idx, Direction::Incoming)
                .filter(|e| *e.weight() == kind)
                .count()
        })
    }

    /// Sorted node-link form used for serialization.
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<GraphNode> = self.all_nodes().cloned().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut links: Vec<LinkRecord> = self
            .edges()
            .map(|(source, target, kind)| LinkRecord {
                source: source.name.clone(),
                target: target.name.clone(),
                kind,
            })
            .collect();
        links.sort_by(|a, b| {
            (&a.source, &a.target, a.kind).cmp(&(&b.source, &b.target, b.kind))
        });

        GraphSnapshot {
            directed: true,
            nodes,
            links,
        }
    }
}

impl Default for CodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for CodeGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

/// Node-link representation of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub directed: bool,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}
