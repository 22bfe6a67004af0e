//! The in-memory model of an exported workflow document.
//!
//! A document is a list of [`Node`]s, a [`Connections`] map keyed by node display name, and
//! any number of opaque top-level fields (`name`, `active`, `settings`, `meta`, ...). The
//! top-level key order of a loaded document is remembered and reproduced on save.

mod connection;
mod io;
mod node;
mod path;
mod value;

pub use connection::*;
pub use node::Node;
pub use path::*;
pub use value::*;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

const NODES_KEY: &str = "nodes";
const CONNECTIONS_KEY: &str = "connections";

/// A complete workflow graph document.
///
/// The document is an owned value: every editing and validation call receives it
/// explicitly, and nothing in the crate keeps a reference to it between calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowDocument {
    pub nodes: Vec<Node>,
    pub connections: Connections,
    /// Top-level fields other than `nodes` and `connections`, in document order.
    pub(crate) fields: ParamMap,
    /// Top-level key order as loaded, including `nodes` and `connections`.
    pub(crate) layout: Vec<String>,
}

impl WorkflowDocument {
    /// Creates an empty document with no nodes, connections or metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a top-level pass-through field such as `name` or `settings`.
    pub fn document_field(&self, key: &str) -> Option<&ParamValue> {
        self.fields.get(key)
    }

    /// Iterates the top-level pass-through fields in document order.
    pub fn document_fields(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Display names of all nodes, in node order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }
}

impl Serialize for WorkflowDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut wrote_nodes = false;
        let mut wrote_connections = false;

        for key in &self.layout {
            match key.as_str() {
                NODES_KEY if !wrote_nodes => {
                    map.serialize_entry(NODES_KEY, &self.nodes)?;
                    wrote_nodes = true;
                }
                CONNECTIONS_KEY if !wrote_connections => {
                    map.serialize_entry(CONNECTIONS_KEY, &self.connections)?;
                    wrote_connections = true;
                }
                other => {
                    if let Some(value) = self.fields.get(other) {
                        map.serialize_entry(other, value)?;
                    }
                }
            }
        }

        // Anything the layout does not know about goes at the end.
        if !wrote_nodes {
            map.serialize_entry(NODES_KEY, &self.nodes)?;
        }
        if !wrote_connections {
            map.serialize_entry(CONNECTIONS_KEY, &self.connections)?;
        }
        for (key, value) in &self.fields {
            if !self.layout.iter().any(|k| k == key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WorkflowDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::deserialize(deserializer)?;
        let layout: Vec<String> = raw.keys().cloned().collect();

        let mut nodes_value = None;
        let mut connections_value = None;
        let mut fields = ParamMap::new();
        for (key, value) in raw {
            match key.as_str() {
                NODES_KEY => nodes_value = Some(value),
                CONNECTIONS_KEY => connections_value = Some(value),
                _ => {
                    fields.insert(key, ParamValue::from(value));
                }
            }
        }

        let nodes = match nodes_value {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    serde_json::from_value::<Node>(item)
                        .map_err(|e| <D::Error as de::Error>::custom(format!("node #{}: {}", i, e)))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(<D::Error as de::Error>::custom("`nodes` is not a sequence")),
            None => return Err(<D::Error as de::Error>::missing_field(NODES_KEY)),
        };

        let connections = match connections_value {
            Some(value) => serde_json::from_value::<Connections>(value)
                .map_err(|e| <D::Error as de::Error>::custom(format!("connections: {}", e)))?,
            None => Connections::default(),
        };

        Ok(Self {
            nodes,
            connections,
            fields,
            layout,
        })
    }
}
