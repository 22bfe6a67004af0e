use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a violation matters to whoever imports the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document should not be imported as it is.
    Error,
    /// Worth a look, but the document can be imported.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What exactly is wrong with the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationKind {
    /// An edge names a target node that does not exist.
    DanglingEdge {
        source: String,
        kind: String,
        branch: usize,
        target: String,
    },
    /// A connection entry is keyed by a name that matches no node.
    UnknownSource { source: String },
    /// A router does not declare one branch per routing outcome.
    BranchCountMismatch {
        source: String,
        expected: usize,
        actual: usize,
    },
    /// A router branch within the declared outcomes has no edges.
    EmptyBranch { source: String, branch: usize },
    /// The given branch of `source` does not lead to the asserted target first.
    MissingExpectedEdge {
        source: String,
        expected_target: String,
        branch: usize,
        actual: Option<String>,
    },
    /// An asserted side-channel `provider -> consumer` edge is absent.
    MissingSideChannel {
        consumer: String,
        provider: String,
        kind: String,
        reversed: bool,
    },
    /// A string field does (or does not) contain an asserted fragment.
    FieldContent {
        node_id: String,
        path: String,
        fragment: String,
        expected_present: bool,
    },
    /// A field check could not run because the node or string field is missing.
    FieldUnavailable {
        node_id: String,
        path: String,
        reason: String,
    },
}

impl ViolationKind {
    /// A stable kebab-case code for the violation type.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::DanglingEdge { .. } => "dangling-edge",
            ViolationKind::UnknownSource { .. } => "unknown-source",
            ViolationKind::BranchCountMismatch { .. } => "branch-count-mismatch",
            ViolationKind::EmptyBranch { .. } => "empty-branch",
            ViolationKind::MissingExpectedEdge { .. } => "missing-expected-edge",
            ViolationKind::MissingSideChannel { .. } => "missing-side-channel",
            ViolationKind::FieldContent { .. } => "field-content",
            ViolationKind::FieldUnavailable { .. } => "field-unavailable",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DanglingEdge {
                source,
                kind,
                branch,
                target,
            } => write!(
                f,
                "'{}' {}[{}] -> '{}': target node does not exist",
                source, kind, branch, target
            ),
            ViolationKind::UnknownSource { source } => write!(
                f,
                "connections declared for '{}', which is not a node in the workflow",
                source
            ),
            ViolationKind::BranchCountMismatch {
                source,
                expected,
                actual,
            } => write!(
                f,
                "'{}' has {} branches, expected {}",
                source, actual, expected
            ),
            ViolationKind::EmptyBranch { source, branch } => {
                write!(f, "'{}' branch {} has no edges", source, branch)
            }
            ViolationKind::MissingExpectedEdge {
                source,
                expected_target,
                branch,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "'{}' branch {} goes to '{}', expected '{}'",
                    source, branch, actual, expected_target
                ),
                None => write!(
                    f,
                    "'{}' branch {} has no edge, expected '{}'",
                    source, branch, expected_target
                ),
            },
            ViolationKind::MissingSideChannel {
                consumer,
                provider,
                kind,
                reversed,
            } => {
                if *reversed {
                    write!(
                        f,
                        "{} edge between '{}' and '{}' points the wrong way (expected '{}' -> '{}')",
                        kind, provider, consumer, provider, consumer
                    )
                } else {
                    write!(
                        f,
                        "'{}' is not connected to '{}' through {}",
                        provider, consumer, kind
                    )
                }
            }
            ViolationKind::FieldContent {
                node_id,
                path,
                fragment,
                expected_present,
            } => {
                if *expected_present {
                    write!(f, "'{}' {} does not contain \"{}\"", node_id, path, fragment)
                } else {
                    write!(f, "'{}' {} still contains \"{}\"", node_id, path, fragment)
                }
            }
            ViolationKind::FieldUnavailable {
                node_id,
                path,
                reason,
            } => write!(f, "'{}' {}: {}", node_id, path, reason),
        }
    }
}

/// A single problem found in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(severity: Severity, kind: ViolationKind) -> Self {
        Self { severity, kind }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.kind)
    }
}
