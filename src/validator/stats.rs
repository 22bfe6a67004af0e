use crate::document::WorkflowDocument;
use serde::Serialize;
use std::collections::BTreeMap;

/// Size summary of a workflow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    /// Number of connection entries, i.e. nodes with declared outputs.
    pub sources: usize,
    pub edges: usize,
    /// Edge count per connection kind, sorted by kind.
    pub edges_by_kind: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn from_document(doc: &WorkflowDocument) -> Self {
        let mut edges_by_kind = BTreeMap::new();
        for edge in doc.connections.edges() {
            *edges_by_kind.entry(edge.kind.to_string()).or_insert(0) += 1;
        }
        Self {
            nodes: doc.nodes.len(),
            sources: doc.connections.len(),
            edges: edges_by_kind.values().sum(),
            edges_by_kind,
        }
    }
}
