//! # flowpatch - Workflow Graph Editor and Validator
//!
//! **flowpatch** edits and checks the exported JSON definition of a node-based automation
//! workflow: an ordered list of nodes (each with an `id`, a display `name`, a `type` and a
//! free-form `parameters` bag holding things like embedded code snippets) plus a connection
//! map keyed by node display name.
//!
//! ## Core Workflow
//!
//! 1.  **Load**: Read a workflow file into a [`document::WorkflowDocument`]. Unknown fields are
//!     kept and written back in their original order.
//! 2.  **Edit**: Use the editor methods directly (`set_node_field`, `append_node`,
//!     `set_connection`, `remove_nodes_not_in`, ...) or describe the edits as a
//!     [`patch::Patch`] and apply it all-or-nothing.
//! 3.  **Validate**: Describe routers, expected edges and side channels as
//!     [`validator::ValidationRules`] and collect [`validator::Violation`]s.
//! 4.  **Save**: Write the document back atomically.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowpatch::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut doc = load_graph("workflow.json")?;
//!
//!     // Rewrite the embedded code of one node.
//!     let path: FieldPath = "parameters.jsCode".parse()?;
//!     doc.set_node_field("extract-data", &path, "return items;".into())?;
//!
//!     // Wire a new node behind it.
//!     doc.append_node(Node::new("notify", "Notify Staff", "n8n-nodes-base.httpRequest"))?;
//!     doc.set_connection("Extract Data", "main", vec![vec![Edge::main("Notify Staff")]]);
//!
//!     // Check the result before writing it back.
//!     let rules = ValidationRules::new()
//!         .router("Intent Router", 4)
//!         .expect_edge("Extract Data", "Notify Staff");
//!     let violations = validate(&doc, &rules);
//!     println!("{}", ReportFormatter::format_report(&GraphStats::from_document(&doc), &violations));
//!
//!     if !has_errors(&violations) {
//!         save_graph(&doc, "workflow.json")?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod editor;
pub mod error;
pub mod patch;
pub mod prelude;
pub mod report;
pub mod validator;
