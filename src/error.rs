use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing a workflow document (or a patch/rule file).
///
/// These are fatal: they are raised before any mutation happens.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed workflow document: {0}")]
    MalformedDocument(String),

    #[error("Failed to serialize workflow document: {0}")]
    Serialize(String),

    #[error("Invalid {what} definition: {message}")]
    InvalidDefinition { what: &'static str, message: String },
}

/// Errors raised by editing operations that cannot complete their intent.
///
/// An operation that returns one of these leaves the document untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("No node with id '{id}' exists in the workflow")]
    NodeNotFound { id: String },

    #[error("A node with id '{id}' already exists in the workflow")]
    DuplicateId { id: String },

    #[error("The name '{name}' is already used by a node or a connection entry")]
    DuplicateName { name: String },

    #[error("Invalid field path '{path}': {reason}")]
    InvalidFieldPath { path: String, reason: String },

    #[error("Field '{path}' does not exist on node '{id}'")]
    FieldNotFound { id: String, path: String },

    #[error("Cannot descend into '{path}' on node '{id}': found a {found}, not a container")]
    NotAContainer {
        id: String,
        path: String,
        found: &'static str,
    },

    #[error("Field '{path}' on node '{id}' is a {found}, not a sequence")]
    NotASequence {
        id: String,
        path: String,
        found: &'static str,
    },

    #[error("Field '{path}' on node '{id}' is a {found}, not a string")]
    NotAString {
        id: String,
        path: String,
        found: &'static str,
    },

    #[error("Index {index} is out of bounds for '{path}' on node '{id}' (length {len})")]
    IndexOutOfBounds {
        id: String,
        path: String,
        index: usize,
        len: usize,
    },

    #[error(
        "Branch index {index} is out of bounds for '{source_name}' ({kind}) with {len} branches"
    )]
    BranchIndexOutOfBounds {
        source_name: String,
        kind: String,
        index: usize,
        len: usize,
    },

    #[error("Field '{path}' expects a {expected}, but the value is a {found}")]
    InvalidValue {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Top-level field '{field}' is reserved and cannot be set directly")]
    ReservedField { field: String },
}

/// A patch operation failed. The document the patch was applied to is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Patch operation #{index} ({op}) failed: {source}")]
pub struct PatchError {
    pub index: usize,
    pub op: &'static str,
    #[source]
    pub source: EditError,
}
