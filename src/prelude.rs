//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the flowpatch
//! crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowpatch::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let doc = load_graph("path/to/workflow.json")?;
//! let patch = Patch::from_file("path/to/patch.json")?;
//! let patched = patch.apply(&doc)?;
//!
//! let rules = ValidationRules::from_file("path/to/rules.json")?;
//! for violation in validate(&patched, &rules) {
//!     println!("{}: {}", violation.severity, violation);
//! }
//! # Ok(())
//! # }
//! ```

// Document model
pub use crate::document::{
    Branch, Connections, Edge, FieldPath, MAIN, Node, ParamMap, ParamValue, WorkflowDocument,
};

// Editing
pub use crate::editor::{load_graph, save_graph};
pub use crate::patch::{EditOp, Patch};

// Validation
pub use crate::validator::{
    GraphStats, Severity, ValidationRules, Validator, Violation, ViolationKind, has_errors,
    validate,
};

// Error types
pub use crate::error::{DocumentError, EditError, PatchError};

// Report formatting
pub use crate::report::ReportFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
