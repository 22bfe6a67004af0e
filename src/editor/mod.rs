//! Editing operations on a [`WorkflowDocument`].
//!
//! Every operation either completes its intent or returns an [`EditError`] and leaves the
//! document exactly as it was. Nodes are located by `id`; connections are keyed by display
//! name and are never validated here, that is the [`crate::validator`]'s job.

mod escape;
mod fields;

pub use escape::unescape_snippet;

use crate::document::{Branch, FieldPath, Node, ParamValue, WorkflowDocument};
use crate::error::{DocumentError, EditError};
use ahash::AHashSet;
use fields::FieldCtx;
use std::path::Path;
use tracing::{debug, warn};

const RESERVED_DOCUMENT_FIELDS: [&str; 2] = ["nodes", "connections"];

impl WorkflowDocument {
    pub fn find_node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn node_index(&self, id: &str) -> Result<usize, EditError> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| EditError::NodeNotFound { id: id.to_string() })
    }

    /// Overwrites the field at `path` on the node with the given `id`.
    ///
    /// Intermediate mappings are created as needed. Setting `id` keeps ids unique; setting
    /// `name` does not touch the connection map (use [`WorkflowDocument::rename_node`] for
    /// that).
    pub fn set_node_field(
        &mut self,
        id: &str,
        path: &FieldPath,
        value: ParamValue,
    ) -> Result<(), EditError> {
        let index = self.node_index(id)?;

        if path.root() == "id" && path.rest().is_empty() {
            if let ParamValue::String(new_id) = &value {
                if new_id != id && self.find_node_by_id(new_id).is_some() {
                    return Err(EditError::DuplicateId { id: new_id.clone() });
                }
            }
        }

        // Edit a copy so a failure halfway down the path leaves the node untouched.
        let mut updated = self.nodes[index].clone();
        fields::assign(&mut updated, path, value)?;

        let old_name = &self.nodes[index].name;
        if updated.name != *old_name && self.is_referenced(old_name) {
            warn!(
                id,
                old_name = %old_name,
                new_name = %updated.name,
                "node renamed by field edit; connections still use the old name"
            );
        }

        debug!(id, path = %path, "set node field");
        self.nodes[index] = updated;
        Ok(())
    }

    /// Appends `node` after all existing nodes.
    pub fn append_node(&mut self, node: Node) -> Result<(), EditError> {
        if self.find_node_by_id(&node.id).is_some() {
            return Err(EditError::DuplicateId { id: node.id });
        }
        debug!(id = %node.id, name = %node.name, "append node");
        self.nodes.push(node);
        Ok(())
    }

    /// Replaces the whole branch list of `(source, kind)`. Targets are not checked.
    pub fn set_connection(&mut self, source: &str, kind: &str, branches: Vec<Branch>) {
        debug!(source, kind, branches = branches.len(), "set connection");
        self.connections.set(source, kind, branches);
    }

    /// Inserts `branch` at `index` in the branch list of `(source, kind)`.
    ///
    /// The list is first padded with empty branches up to `pad_to` entries, which is how a
    /// new leading route is added to a router whose trailing routes may not be wired yet.
    pub fn insert_branch(
        &mut self,
        source: &str,
        kind: &str,
        index: usize,
        branch: Branch,
        pad_to: usize,
    ) -> Result<(), EditError> {
        let current_len = self
            .connections
            .branches(source, kind)
            .map_or(0, <[Branch]>::len);
        let padded_len = current_len.max(pad_to);
        if index > padded_len {
            return Err(EditError::BranchIndexOutOfBounds {
                source_name: source.to_string(),
                kind: kind.to_string(),
                index,
                len: padded_len,
            });
        }

        let branches = self.connections.branches_mut(source, kind);
        branches.resize_with(padded_len, Vec::new);
        branches.insert(index, branch);
        debug!(source, kind, index, branches = branches.len(), "insert branch");
        Ok(())
    }

    /// Drops every node whose id is not in `keep_ids`, preserving the order of the rest.
    ///
    /// The connection map is left alone: entries owned by or pointing at removed nodes stay
    /// behind until the caller rewrites them, and the validator reports them meanwhile.
    pub fn remove_nodes_not_in<I, S>(&mut self, keep_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: AHashSet<String> = keep_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let before = self.nodes.len();
        let mut orphaned = Vec::new();
        self.nodes.retain(|node| {
            let kept = keep.contains(&node.id);
            if !kept {
                orphaned.push(node.name.clone());
            }
            kept
        });

        let still_wired = orphaned
            .iter()
            .filter(|name| self.connections.contains_source(name))
            .count();
        if still_wired > 0 {
            warn!(
                count = still_wired,
                "removed nodes still own connection entries"
            );
        }

        let removed = before - self.nodes.len();
        debug!(removed, kept = self.nodes.len(), "remove nodes not in keep set");
        removed
    }

    /// Keeps only the connection entries whose source name is in `keep_sources`.
    pub fn remove_connections_not_from<I, S>(&mut self, keep_sources: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: AHashSet<String> = keep_sources
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let removed = self.connections.retain_sources(|source| keep.contains(source));
        debug!(removed, "remove connections not from keep set");
        removed
    }

    /// Inserts `value` at `index` into the sequence field at `path`.
    pub fn insert_field_item(
        &mut self,
        id: &str,
        path: &FieldPath,
        index: usize,
        value: ParamValue,
    ) -> Result<(), EditError> {
        let node_index = self.node_index(id)?;
        let ctx = FieldCtx { id, path };
        let target = fields::value_mut(&mut self.nodes[node_index], path, &ctx)?;

        let items = match target {
            ParamValue::Sequence(items) => items,
            other => return Err(ctx.not_a_sequence(other.type_name())),
        };
        if index > items.len() {
            return Err(ctx.out_of_bounds(index, items.len()));
        }
        items.insert(index, value);
        debug!(id, path = %path, index, "insert field item");
        Ok(())
    }

    /// Repairs a double-escaped string field in place. Returns whether anything changed.
    pub fn unescape_field(&mut self, id: &str, path: &FieldPath) -> Result<bool, EditError> {
        let node_index = self.node_index(id)?;
        let ctx = FieldCtx { id, path };
        let target = fields::value_mut(&mut self.nodes[node_index], path, &ctx)?;

        let text = match target {
            ParamValue::String(text) => text,
            other => return Err(ctx.not_a_string(other.type_name())),
        };
        let repaired = unescape_snippet(text);
        let changed = repaired != *text;
        *text = repaired;
        debug!(id, path = %path, changed, "unescape field");
        Ok(changed)
    }

    /// Sets a top-level pass-through field such as `name`, `active` or `versionId`.
    pub fn set_document_field(&mut self, key: &str, value: ParamValue) -> Result<(), EditError> {
        if RESERVED_DOCUMENT_FIELDS.contains(&key) {
            return Err(EditError::ReservedField {
                field: key.to_string(),
            });
        }
        if !self.layout.iter().any(|k| k == key) {
            self.layout.push(key.to_string());
        }
        self.fields.insert(key.to_string(), value);
        debug!(key, "set document field");
        Ok(())
    }

    /// Renames a node and rewrites every connection key and edge target that used the old
    /// display name.
    pub fn rename_node(&mut self, id: &str, new_name: &str) -> Result<(), EditError> {
        let index = self.node_index(id)?;
        let old_name = self.nodes[index].name.clone();
        if old_name == new_name {
            return Ok(());
        }
        // A leftover connection entry under the new name would be overwritten by the rename.
        if self.find_node_by_name(new_name).is_some() || self.connections.contains_source(new_name)
        {
            return Err(EditError::DuplicateName {
                name: new_name.to_string(),
            });
        }

        self.nodes[index].name = new_name.to_string();
        self.connections.rename_node(&old_name, new_name);
        debug!(id, old_name = %old_name, new_name, "rename node");
        Ok(())
    }

    /// Whether any connection entry is keyed by, or points at, `name`.
    fn is_referenced(&self, name: &str) -> bool {
        self.connections.contains_source(name)
            || self.connections.edges().any(|e| e.edge.node == name)
    }
}

/// Loads a workflow document from `path`.
pub fn load_graph(path: impl AsRef<Path>) -> Result<WorkflowDocument, DocumentError> {
    WorkflowDocument::load(path)
}

/// Writes `doc` to `path` atomically.
pub fn save_graph(doc: &WorkflowDocument, path: impl AsRef<Path>) -> Result<(), DocumentError> {
    doc.save(path)
}

pub fn find_node_by_id<'a>(doc: &'a WorkflowDocument, id: &str) -> Option<&'a Node> {
    doc.find_node_by_id(id)
}

pub fn set_node_field(
    doc: &mut WorkflowDocument,
    id: &str,
    path: &FieldPath,
    value: ParamValue,
) -> Result<(), EditError> {
    doc.set_node_field(id, path, value)
}

pub fn append_node(doc: &mut WorkflowDocument, node: Node) -> Result<(), EditError> {
    doc.append_node(node)
}

pub fn set_connection(doc: &mut WorkflowDocument, source: &str, kind: &str, branches: Vec<Branch>) {
    doc.set_connection(source, kind, branches)
}

pub fn remove_nodes_not_in<I, S>(doc: &mut WorkflowDocument, keep_ids: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    doc.remove_nodes_not_in(keep_ids)
}
