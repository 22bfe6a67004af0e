//! Declarative, all-or-nothing edits.
//!
//! A [`Patch`] is an ordered list of [`EditOp`]s. Applying it either yields a fully edited
//! copy of the document or a [`PatchError`] naming the first operation that failed; the
//! input document is never modified, so a failed patch can never be persisted.

mod op;

pub use op::EditOp;

use crate::document::{Branch, FieldPath, Node, ParamValue, WorkflowDocument};
use crate::error::{DocumentError, PatchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// An ordered list of edit operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    ops: Vec<EditOp>,
}

impl Patch {
    pub fn new(ops: Vec<EditOp>) -> Self {
        Self { ops }
    }

    pub fn builder() -> PatchBuilder {
        PatchBuilder::default()
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Parses a patch from a JSON array of operations.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::InvalidDefinition {
            what: "patch",
            message: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Applies every operation, in order, to a copy of `doc`.
    pub fn apply(&self, doc: &WorkflowDocument) -> Result<WorkflowDocument, PatchError> {
        let mut working = doc.clone();
        for (index, op) in self.ops.iter().enumerate() {
            debug!(index, op = op.name(), "applying patch operation");
            op.apply(&mut working).map_err(|source| PatchError {
                index,
                op: op.name(),
                source,
            })?;
        }
        info!(operations = self.ops.len(), "patch applied");
        Ok(working)
    }

    /// Like [`Patch::apply`], but replaces `doc` with the result on success.
    pub fn apply_in_place(&self, doc: &mut WorkflowDocument) -> Result<(), PatchError> {
        *doc = self.apply(doc)?;
        Ok(())
    }
}

/// Fluent construction of a [`Patch`] in code.
#[derive(Debug, Default)]
pub struct PatchBuilder {
    ops: Vec<EditOp>,
}

impl PatchBuilder {
    pub fn op(mut self, op: EditOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn set_field(self, id: &str, path: FieldPath, value: impl Into<ParamValue>) -> Self {
        self.op(EditOp::SetField {
            id: id.to_string(),
            path,
            value: value.into(),
        })
    }

    pub fn append_node(self, node: Node) -> Self {
        self.op(EditOp::AppendNode { node })
    }

    pub fn set_connection(self, source: &str, kind: &str, branches: Vec<Branch>) -> Self {
        self.op(EditOp::SetConnection {
            source: source.to_string(),
            kind: kind.to_string(),
            branches,
        })
    }

    pub fn retain_nodes<S: AsRef<str>>(self, ids: &[S]) -> Self {
        self.op(EditOp::RetainNodes {
            ids: ids.iter().map(|s| s.as_ref().to_string()).collect(),
        })
    }

    pub fn retain_connections<S: AsRef<str>>(self, sources: &[S]) -> Self {
        self.op(EditOp::RetainConnections {
            sources: sources.iter().map(|s| s.as_ref().to_string()).collect(),
        })
    }

    pub fn set_document_field(self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.op(EditOp::SetDocumentField {
            key: key.to_string(),
            value: value.into(),
        })
    }

    pub fn build(self) -> Patch {
        Patch { ops: self.ops }
    }
}
