//! Structural checks over a workflow graph.
//!
//! The validator never fails: it walks the document, runs every check and returns the
//! violations it found, in a fixed order:
//!
//! 1. dangling edges (targets that are not node names)
//! 2. connection entries keyed by unknown node names
//! 3. router branch counts and empty branches
//! 4. expected `main` edges
//! 5. side-channel edges (`ai_languageModel`, `ai_memory`, ...)
//! 6. string field content
//!
//! Within each group violations follow document order, so validating the same document twice
//! yields the same list.

mod rules;
mod stats;
mod violation;

pub use rules::{EdgeAssertion, FieldCheck, RouterRule, SideChannelAssertion, ValidationRules};
pub use stats::GraphStats;
pub use violation::{Severity, Violation, ViolationKind};

use crate::document::{MAIN, ParamValue, WorkflowDocument};
use ahash::AHashSet;
use tracing::debug;

/// Runs a rule set against one document.
pub struct Validator<'a> {
    doc: &'a WorkflowDocument,
    names: AHashSet<&'a str>,
}

impl<'a> Validator<'a> {
    pub fn new(doc: &'a WorkflowDocument) -> Self {
        Self {
            doc,
            names: doc.node_names().collect(),
        }
    }

    pub fn validate(&self, rules: &ValidationRules) -> Vec<Violation> {
        let mut violations = Vec::new();

        self.check_dangling_edges(&mut violations);
        self.check_unknown_sources(
            rules.unknown_source_severity.unwrap_or(Severity::Warning),
            &mut violations,
        );
        for router in &rules.routers {
            self.check_router(router, &mut violations);
        }
        for assertion in &rules.expected_edges {
            self.check_expected_edge(
                &assertion.source,
                assertion.branch,
                &assertion.target,
                assertion.severity.unwrap_or(Severity::Error),
                &mut violations,
            );
        }
        for assertion in &rules.side_channels {
            self.check_side_channel(assertion, &mut violations);
        }
        for check in &rules.field_checks {
            self.check_field(check, &mut violations);
        }

        debug!(violations = violations.len(), "validation finished");
        violations
    }

    fn check_dangling_edges(&self, out: &mut Vec<Violation>) {
        for edge in self.doc.connections.edges() {
            if !self.names.contains(edge.edge.node.as_str()) {
                out.push(Violation::new(
                    Severity::Error,
                    ViolationKind::DanglingEdge {
                        source: edge.source.to_string(),
                        kind: edge.kind.to_string(),
                        branch: edge.branch,
                        target: edge.edge.node.clone(),
                    },
                ));
            }
        }
    }

    fn check_unknown_sources(&self, severity: Severity, out: &mut Vec<Violation>) {
        for source in self.doc.connections.sources() {
            if !self.names.contains(source) {
                out.push(Violation::new(
                    severity,
                    ViolationKind::UnknownSource {
                        source: source.to_string(),
                    },
                ));
            }
        }
    }

    fn check_router(&self, router: &RouterRule, out: &mut Vec<Violation>) {
        let severity = router.severity.unwrap_or(Severity::Error);
        let branches = self
            .doc
            .connections
            .branches(&router.node, MAIN)
            .unwrap_or_default();

        if branches.len() != router.outcomes {
            out.push(Violation::new(
                severity,
                ViolationKind::BranchCountMismatch {
                    source: router.node.clone(),
                    expected: router.outcomes,
                    actual: branches.len(),
                },
            ));
        }

        for (index, branch) in branches.iter().take(router.outcomes).enumerate() {
            if branch.is_empty() {
                out.push(Violation::new(
                    severity,
                    ViolationKind::EmptyBranch {
                        source: router.node.clone(),
                        branch: index,
                    },
                ));
            }
        }

        let target_severity = router.target_severity.unwrap_or(Severity::Error);
        for (index, target) in router.targets.iter().enumerate() {
            // Empty branches were already reported above.
            if branches.get(index).is_some_and(|b| b.is_empty()) {
                continue;
            }
            self.check_expected_edge(&router.node, index, target, target_severity, out);
        }
    }

    fn check_expected_edge(
        &self,
        source: &str,
        branch: usize,
        target: &str,
        severity: Severity,
        out: &mut Vec<Violation>,
    ) {
        // Only the first edge of a branch counts as where the branch goes.
        let actual = self
            .doc
            .connections
            .branches(source, MAIN)
            .and_then(|branches| branches.get(branch))
            .and_then(|edges| edges.first())
            .map(|edge| edge.node.as_str());

        if actual == Some(target) {
            return;
        }

        out.push(Violation::new(
            severity,
            ViolationKind::MissingExpectedEdge {
                source: source.to_string(),
                expected_target: target.to_string(),
                branch,
                actual: actual.map(str::to_string),
            },
        ));
    }

    fn check_side_channel(&self, assertion: &SideChannelAssertion, out: &mut Vec<Violation>) {
        // A side channel is the first edge of the provider's first branch for that kind.
        let connected = |from: &str, to: &str| {
            self.doc
                .connections
                .branches(from, &assertion.kind)
                .and_then(|branches| branches.first())
                .and_then(|edges| edges.first())
                .is_some_and(|edge| edge.node == to)
        };

        if connected(&assertion.provider, &assertion.consumer) {
            return;
        }

        out.push(Violation::new(
            assertion.severity.unwrap_or(Severity::Error),
            ViolationKind::MissingSideChannel {
                consumer: assertion.consumer.clone(),
                provider: assertion.provider.clone(),
                kind: assertion.kind.clone(),
                reversed: connected(&assertion.consumer, &assertion.provider),
            },
        ));
    }

    fn check_field(&self, check: &FieldCheck, out: &mut Vec<Violation>) {
        let severity = check.severity.unwrap_or(Severity::Error);
        let unavailable = |reason: String| {
            Violation::new(
                severity,
                ViolationKind::FieldUnavailable {
                    node_id: check.node_id.clone(),
                    path: check.path.to_string(),
                    reason,
                },
            )
        };

        let Some(node) = self.doc.find_node_by_id(&check.node_id) else {
            out.push(unavailable("node does not exist".to_string()));
            return;
        };
        let text = match node.field(&check.path) {
            Some(ParamValue::String(text)) => text,
            Some(other) => {
                out.push(unavailable(format!(
                    "field is a {}, not a string",
                    other.type_name()
                )));
                return;
            }
            None => {
                out.push(unavailable("field does not exist".to_string()));
                return;
            }
        };

        let expectations = check
            .contains
            .iter()
            .map(|fragment| (fragment, true))
            .chain(check.absent.iter().map(|fragment| (fragment, false)));
        for (fragment, expected_present) in expectations {
            if text.contains(fragment.as_str()) != expected_present {
                out.push(Violation::new(
                    severity,
                    ViolationKind::FieldContent {
                        node_id: check.node_id.clone(),
                        path: check.path.to_string(),
                        fragment: fragment.clone(),
                        expected_present,
                    },
                ));
            }
        }
    }
}

/// Validates `doc` against `rules`. See [`Validator`].
pub fn validate(doc: &WorkflowDocument, rules: &ValidationRules) -> Vec<Violation> {
    Validator::new(doc).validate(rules)
}

/// Whether any violation blocks import.
pub fn has_errors(violations: &[Violation]) -> bool {
    violations.iter().any(Violation::is_error)
}
