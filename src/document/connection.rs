use super::value::ParamMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The primary data-flow connection kind.
pub const MAIN: &str = "main";

/// A directed link to a target node's input slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Display name of the target node.
    pub node: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Input slot on the target node.
    pub index: u32,
    /// Edge keys this crate does not interpret, written back after `index`.
    #[serde(flatten)]
    pub extra: ParamMap,
}

impl Edge {
    pub fn new(node: impl Into<String>, kind: impl Into<String>, index: u32) -> Self {
        Self {
            node: node.into(),
            kind: kind.into(),
            index,
            extra: ParamMap::new(),
        }
    }

    /// A `main` edge into the first input of `node`.
    pub fn main(node: impl Into<String>) -> Self {
        Self::new(node, MAIN, 0)
    }
}

/// One routing outcome of a node: every edge fired when that outcome is taken.
pub type Branch = Vec<Edge>;

/// The outputs of one source node, keyed by connection kind.
pub type NodeOutputs = IndexMap<String, Vec<Branch>>;

/// A borrowed view of one edge together with where it lives in the connection map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef<'a> {
    pub source: &'a str,
    pub kind: &'a str,
    pub branch: usize,
    pub edge: &'a Edge,
}

/// The connection map: source display name -> kind -> ordered branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connections(IndexMap<String, NodeOutputs>);

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, source: &str) -> Option<&NodeOutputs> {
        self.0.get(source)
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.0.contains_key(source)
    }

    /// The branches of `source` for connection `kind`, if any were declared.
    pub fn branches(&self, source: &str, kind: &str) -> Option<&[Branch]> {
        self.0
            .get(source)
            .and_then(|outputs| outputs.get(kind))
            .map(Vec::as_slice)
    }

    /// Replaces the whole branch list of `(source, kind)`.
    pub fn set(&mut self, source: impl Into<String>, kind: impl Into<String>, branches: Vec<Branch>) {
        self.0
            .entry(source.into())
            .or_default()
            .insert(kind.into(), branches);
    }

    pub(crate) fn branches_mut(&mut self, source: &str, kind: &str) -> &mut Vec<Branch> {
        self.0
            .entry(source.to_string())
            .or_default()
            .entry(kind.to_string())
            .or_default()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeOutputs)> {
        self.0.iter().map(|(source, outputs)| (source.as_str(), outputs))
    }

    /// Every edge in map order: source, then kind, then branch, then position in branch.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.0.iter().flat_map(|(source, outputs)| {
            outputs.iter().flat_map(move |(kind, branches)| {
                branches.iter().enumerate().flat_map(move |(branch, edges)| {
                    edges.iter().map(move |edge| EdgeRef {
                        source: source.as_str(),
                        kind: kind.as_str(),
                        branch,
                        edge,
                    })
                })
            })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Keeps only the sources for which `keep` returns true. Returns how many were dropped.
    pub fn retain_sources(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.0.len();
        self.0.retain(|source, _| keep(source));
        before - self.0.len()
    }

    /// Rewrites every occurrence of `old` as a source key or edge target to `new`.
    /// The renamed source keeps its position in the map.
    pub(crate) fn rename_node(&mut self, old: &str, new: &str) {
        if let Some(index) = self.0.get_index_of(old) {
            if let Some((_, outputs)) = self.0.shift_remove_index(index) {
                let (inserted, _) = self.0.insert_full(new.to_string(), outputs);
                if index < self.0.len() {
                    self.0.move_index(inserted, index);
                }
            }
        }
        for outputs in self.0.values_mut() {
            for branches in outputs.values_mut() {
                for edge in branches.iter_mut().flatten() {
                    if edge.node == old {
                        edge.node = new.to_string();
                    }
                }
            }
        }
    }
}
