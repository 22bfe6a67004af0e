use super::violation::Severity;
use crate::document::FieldPath;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A node that routes on an enumerated condition set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterRule {
    /// Display name of the router node.
    pub node: String,
    /// Number of routing outcomes, i.e. the number of `main` branches it must declare.
    pub outcomes: usize,
    /// Optional expected first target per branch, in outcome order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Severity for the per-branch target assertions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_severity: Option<Severity>,
}

/// Asserts that `source` has a `main` edge to `target` on the given branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAssertion {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub branch: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Asserts that `provider` feeds `consumer` through a side-channel `kind`
/// (a language-model or memory provider attached to an agent, for instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideChannelAssertion {
    pub consumer: String,
    pub provider: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Asserts fragments that must, or must not, appear in a node's string field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub node_id: String,
    pub path: FieldPath,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub absent: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Everything the validator should check beyond the always-on structural checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub routers: Vec<RouterRule>,
    pub expected_edges: Vec<EdgeAssertion>,
    pub side_channels: Vec<SideChannelAssertion>,
    pub field_checks: Vec<FieldCheck>,
    /// Severity for connection entries keyed by unknown node names. Defaults to warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_source_severity: Option<Severity>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::InvalidDefinition {
            what: "rule set",
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

    /// Declares `node` as a router with `outcomes` branches.
    pub fn router(mut self, node: &str, outcomes: usize) -> Self {
        self.routers.push(RouterRule {
            node: node.to_string(),
            outcomes,
            targets: Vec::new(),
            severity: None,
            target_severity: None,
        });
        self
    }

    /// Declares `node` as a router whose branch `i` must lead to `targets[i]`.
    pub fn router_with_targets<S: AsRef<str>>(mut self, node: &str, targets: &[S]) -> Self {
        self.routers.push(RouterRule {
            node: node.to_string(),
            outcomes: targets.len(),
            targets: targets.iter().map(|t| t.as_ref().to_string()).collect(),
            severity: None,
            target_severity: None,
        });
        self
    }

    pub fn expect_edge(self, source: &str, target: &str) -> Self {
        self.expect_edge_at(source, 0, target)
    }

    pub fn expect_edge_at(mut self, source: &str, branch: usize, target: &str) -> Self {
        self.expected_edges.push(EdgeAssertion {
            source: source.to_string(),
            target: target.to_string(),
            branch,
            severity: None,
        });
        self
    }

    pub fn side_channel(mut self, consumer: &str, provider: &str, kind: &str) -> Self {
        self.side_channels.push(SideChannelAssertion {
            consumer: consumer.to_string(),
            provider: provider.to_string(),
            kind: kind.to_string(),
            severity: None,
        });
        self
    }

    pub fn field_check(mut self, check: FieldCheck) -> Self {
        self.field_checks.push(check);
        self
    }
}
