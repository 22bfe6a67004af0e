use crate::document::{Branch, FieldPath, MAIN, Node, ParamValue, WorkflowDocument};
use crate::error::EditError;
use serde::{Deserialize, Serialize};

fn main_kind() -> String {
    MAIN.to_string()
}

/// One editing operation, as written in a patch file.
///
/// ```json
/// { "op": "set_field", "id": "extract-data", "path": "parameters.jsCode", "value": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    SetField {
        id: String,
        path: FieldPath,
        value: ParamValue,
    },
    InsertItem {
        id: String,
        path: FieldPath,
        index: usize,
        value: ParamValue,
    },
    UnescapeField {
        id: String,
        path: FieldPath,
    },
    AppendNode {
        node: Node,
    },
    RenameNode {
        id: String,
        name: String,
    },
    RetainNodes {
        ids: Vec<String>,
    },
    SetConnection {
        source: String,
        #[serde(default = "main_kind")]
        kind: String,
        branches: Vec<Branch>,
    },
    InsertBranch {
        source: String,
        #[serde(default = "main_kind")]
        kind: String,
        index: usize,
        branch: Branch,
        #[serde(default)]
        pad_to: usize,
    },
    RetainConnections {
        sources: Vec<String>,
    },
    SetDocumentField {
        key: String,
        value: ParamValue,
    },
}

impl EditOp {
    /// The tag this operation carries in a patch file.
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::SetField { .. } => "set_field",
            EditOp::InsertItem { .. } => "insert_item",
            EditOp::UnescapeField { .. } => "unescape_field",
            EditOp::AppendNode { .. } => "append_node",
            EditOp::RenameNode { .. } => "rename_node",
            EditOp::RetainNodes { .. } => "retain_nodes",
            EditOp::SetConnection { .. } => "set_connection",
            EditOp::InsertBranch { .. } => "insert_branch",
            EditOp::RetainConnections { .. } => "retain_connections",
            EditOp::SetDocumentField { .. } => "set_document_field",
        }
    }

    /// Applies this operation directly to `doc`.
    pub fn apply(&self, doc: &mut WorkflowDocument) -> Result<(), EditError> {
        match self {
            EditOp::SetField { id, path, value } => doc.set_node_field(id, path, value.clone()),
            EditOp::InsertItem {
                id,
                path,
                index,
                value,
            } => doc.insert_field_item(id, path, *index, value.clone()),
            EditOp::UnescapeField { id, path } => doc.unescape_field(id, path).map(|_| ()),
            EditOp::AppendNode { node } => doc.append_node(node.clone()),
            EditOp::RenameNode { id, name } => doc.rename_node(id, name),
            EditOp::RetainNodes { ids } => {
                doc.remove_nodes_not_in(ids);
                Ok(())
            }
            EditOp::SetConnection {
                source,
                kind,
                branches,
            } => {
                doc.set_connection(source, kind, branches.clone());
                Ok(())
            }
            EditOp::InsertBranch {
                source,
                kind,
                index,
                branch,
                pad_to,
            } => doc.insert_branch(source, kind, *index, branch.clone(), *pad_to),
            EditOp::RetainConnections { sources } => {
                doc.remove_connections_not_from(sources);
                Ok(())
            }
            EditOp::SetDocumentField { key, value } => doc.set_document_field(key, value.clone()),
        }
    }
}
