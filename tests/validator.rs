//! Validator tests
//!
//! Tests for the graph checks: dangling edges, router branch counts, expected edges,
//! side channels and field content.
mod common;
use common::*;
use flowpatch::prelude::*;
use flowpatch::validator::FieldCheck;

fn kinds(violations: &[Violation]) -> Vec<&'static str> {
    violations.iter().map(|v| v.kind.code()).collect()
}

#[cfg(test)]
mod structural_tests {
    use super::*;

    #[test]
    fn test_clinic_bot_passes_its_rules() {
        let doc = load_clinic_bot();
        let violations = validate(&doc, &clinic_bot_rules());
        assert!(violations.is_empty(), "{:?}", violations);
        assert!(!has_errors(&violations));
    }

    #[test]
    fn test_expected_pair_after_set_connection() {
        let mut doc = create_pair_document();
        doc.set_connection("A", MAIN, vec![vec![Edge::main("B")]]);

        let rules = ValidationRules::new().expect_edge("A", "B");
        assert!(validate(&doc, &rules).is_empty());
    }

    #[test]
    fn test_single_dangling_edge() {
        let mut doc = create_pair_document();
        doc.set_connection("A", MAIN, vec![vec![Edge::main("B"), Edge::main("Ghost")]]);

        let violations = validate(&doc, &ValidationRules::new());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::new(
                Severity::Error,
                ViolationKind::DanglingEdge {
                    source: "A".to_string(),
                    kind: MAIN.to_string(),
                    branch: 0,
                    target: "Ghost".to_string(),
                }
            )
        );

        // Validation does not change anything, so running it again gives the same answer.
        assert_eq!(validate(&doc, &ValidationRules::new()), violations);
    }

    #[test]
    fn test_removed_nodes_leave_dangling_edges_and_unknown_sources() {
        let mut doc = load_clinic_bot();
        doc.remove_nodes_not_in(["webhook", "extract-data"]);

        let violations = validate(&doc, &ValidationRules::new());
        let dangling = violations
            .iter()
            .filter(|v| matches!(v.kind, ViolationKind::DanglingEdge { .. }))
            .count();
        let unknown: Vec<_> = violations
            .iter()
            .filter(|v| matches!(v.kind, ViolationKind::UnknownSource { .. }))
            .collect();

        // Edges owned by removed sources are still checked.
        assert_eq!(dangling, doc_edge_count_without_targets(&doc));
        assert_eq!(unknown.len(), 6);
        assert!(unknown.iter().all(|v| v.severity == Severity::Warning));
        assert!(has_errors(&violations));
    }

    fn doc_edge_count_without_targets(doc: &WorkflowDocument) -> usize {
        doc.connections
            .edges()
            .filter(|e| doc.find_node_by_name(&e.edge.node).is_none())
            .count()
    }

    #[test]
    fn test_unknown_source_severity_override() {
        let mut doc = create_pair_document();
        doc.set_connection("Ghost", MAIN, vec![vec![Edge::main("A")]]);

        let mut rules = ValidationRules::new();
        rules.unknown_source_severity = Some(Severity::Error);
        let violations = validate(&doc, &rules);
        assert_eq!(kinds(&violations), vec!["unknown-source"]);
        assert!(violations[0].is_error());
    }
}

#[cfg(test)]
mod router_tests {
    use super::*;

    fn router_document(branch_sizes: &[usize]) -> WorkflowDocument {
        let mut doc = create_pair_document();
        let branches = branch_sizes
            .iter()
            .map(|&size| vec![Edge::main("B"); size])
            .collect();
        doc.set_connection("A", MAIN, branches);
        doc
    }

    #[test]
    fn test_three_branches_against_four_outcomes() {
        let doc = router_document(&[1, 1, 1]);
        let rules = ValidationRules::new().router("A", 4);

        let violations = validate(&doc, &rules);
        assert_eq!(
            violations,
            vec![Violation::new(
                Severity::Error,
                ViolationKind::BranchCountMismatch {
                    source: "A".to_string(),
                    expected: 4,
                    actual: 3,
                }
            )]
        );
    }

    #[test]
    fn test_matching_branch_count() {
        let doc = router_document(&[1, 2, 1, 1, 1]);
        let rules = ValidationRules::new().router("A", 5);
        assert!(validate(&doc, &rules).is_empty());
    }

    #[test]
    fn test_router_without_connections() {
        let doc = create_pair_document();
        let rules = ValidationRules::new().router("A", 2);
        let violations = validate(&doc, &rules);
        assert!(matches!(
            violations[0].kind,
            ViolationKind::BranchCountMismatch {
                expected: 2,
                actual: 0,
                ..
            }
        ));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_empty_branch_is_reported() {
        let doc = router_document(&[1, 0, 1]);
        let rules = ValidationRules::new().router("A", 3);
        let violations = validate(&doc, &rules);
        assert_eq!(
            violations,
            vec![Violation::new(
                Severity::Error,
                ViolationKind::EmptyBranch {
                    source: "A".to_string(),
                    branch: 1,
                }
            )]
        );
    }

    #[test]
    fn test_router_targets_expand_into_edge_assertions() {
        let doc = load_clinic_bot();
        let rules = ValidationRules::new().router_with_targets(
            "Intent Router",
            &["Book Appointment", "AI Agent", "AI Agent", "AI Agent"],
        );

        let violations = validate(&doc, &rules);
        assert_eq!(
            violations,
            vec![Violation::new(
                Severity::Error,
                ViolationKind::MissingExpectedEdge {
                    source: "Intent Router".to_string(),
                    expected_target: "AI Agent".to_string(),
                    branch: 1,
                    actual: Some("Book Appointment".to_string()),
                }
            )]
        );
    }

    #[test]
    fn test_router_target_severity_override() {
        let doc = load_clinic_bot();
        let mut rules = ValidationRules::new().router_with_targets(
            "Intent Router",
            &["AI Agent", "AI Agent", "AI Agent", "AI Agent"],
        );
        rules.routers[0].target_severity = Some(Severity::Warning);

        let violations = validate(&doc, &rules);
        assert_eq!(violations.len(), 2);
        assert!(!has_errors(&violations));
    }
}

#[cfg(test)]
mod edge_assertion_tests {
    use super::*;

    #[test]
    fn test_missing_expected_edge() {
        let doc = load_clinic_bot();
        let rules = ValidationRules::new().expect_edge("Webhook", "Intent Router");
        let violations = validate(&doc, &rules);
        assert_eq!(
            violations[0].kind,
            ViolationKind::MissingExpectedEdge {
                source: "Webhook".to_string(),
                expected_target: "Intent Router".to_string(),
                branch: 0,
                actual: Some("Extract Data".to_string()),
            }
        );
    }

    #[test]
    fn test_expected_edge_on_specific_branch() {
        let doc = load_clinic_bot();
        let rules = ValidationRules::new()
            .expect_edge_at("Intent Router", 2, "AI Agent")
            .expect_edge_at("Intent Router", 7, "AI Agent");

        let violations = validate(&doc, &rules);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].kind,
            ViolationKind::MissingExpectedEdge {
                source: "Intent Router".to_string(),
                expected_target: "AI Agent".to_string(),
                branch: 7,
                actual: None,
            }
        );
    }

    #[test]
    fn test_expected_target_behind_first_edge_is_missing() {
        let mut doc = create_pair_document();
        doc.set_connection("A", MAIN, vec![vec![Edge::main("Ghost"), Edge::main("B")]]);

        let rules = ValidationRules::new().expect_edge("A", "B");
        let violations = validate(&doc, &rules);
        assert_eq!(kinds(&violations), vec!["dangling-edge", "missing-expected-edge"]);
        assert_eq!(
            violations[1].kind,
            ViolationKind::MissingExpectedEdge {
                source: "A".to_string(),
                expected_target: "B".to_string(),
                branch: 0,
                actual: Some("Ghost".to_string()),
            }
        );
    }

    #[test]
    fn test_expected_edge_from_node_without_outputs() {
        let doc = load_clinic_bot();
        let rules = ValidationRules::new().expect_edge("Analytics", "Send Reply");
        let violations = validate(&doc, &rules);
        assert!(matches!(
            violations[0].kind,
            ViolationKind::MissingExpectedEdge { actual: None, .. }
        ));
    }
}

#[cfg(test)]
mod side_channel_tests {
    use super::*;

    #[test]
    fn test_missing_side_channel() {
        let mut doc = load_clinic_bot();
        doc.connections.retain_sources(|source| source != "Chat Memory");

        let violations = validate(&doc, &clinic_bot_rules());
        assert_eq!(
            violations,
            vec![Violation::new(
                Severity::Error,
                ViolationKind::MissingSideChannel {
                    consumer: "AI Agent".to_string(),
                    provider: "Chat Memory".to_string(),
                    kind: "ai_memory".to_string(),
                    reversed: false,
                }
            )]
        );
    }

    #[test]
    fn test_reversed_side_channel() {
        let mut doc = create_pair_document();
        // B is the agent, A the model; the edge was wired the wrong way round.
        doc.set_connection(
            "B",
            "ai_languageModel",
            vec![vec![Edge::new("A", "ai_languageModel", 0)]],
        );

        let rules = ValidationRules::new().side_channel("B", "A", "ai_languageModel");
        let violations = validate(&doc, &rules);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0].kind,
            ViolationKind::MissingSideChannel { reversed: true, .. }
        ));
        assert!(violations[0].to_string().contains("wrong way"));
    }

    #[test]
    fn test_side_channel_must_be_first_edge_of_first_branch() {
        let rules = ValidationRules::new().side_channel("B", "A", "ai_memory");

        let mut doc = create_pair_document();
        doc.set_connection(
            "A",
            "ai_memory",
            vec![vec![Edge::new("Ghost", "ai_memory", 0), Edge::new("B", "ai_memory", 0)]],
        );
        assert_eq!(
            kinds(&validate(&doc, &rules)),
            vec!["dangling-edge", "missing-side-channel"]
        );

        let mut doc = create_pair_document();
        doc.set_connection(
            "A",
            "ai_memory",
            vec![vec![], vec![Edge::new("B", "ai_memory", 0)]],
        );
        assert_eq!(kinds(&validate(&doc, &rules)), vec!["missing-side-channel"]);
    }

    #[test]
    fn test_side_channel_on_wrong_kind() {
        let mut doc = create_pair_document();
        doc.set_connection("A", MAIN, vec![vec![Edge::main("B")]]);
        let rules = ValidationRules::new().side_channel("B", "A", "ai_memory");
        assert_eq!(kinds(&validate(&doc, &rules)), vec!["missing-side-channel"]);
    }
}

#[cfg(test)]
mod field_check_tests {
    use super::*;

    fn analytics_check(contains: &[&str], absent: &[&str]) -> FieldCheck {
        FieldCheck {
            node_id: "analytics".to_string(),
            path: path("parameters.jsCode"),
            contains: contains.iter().map(|s| s.to_string()).collect(),
            absent: absent.iter().map(|s| s.to_string()).collect(),
            severity: None,
        }
    }

    #[test]
    fn test_field_contains_and_absent() {
        let doc = load_clinic_bot();
        let rules = ValidationRules::new().field_check(analytics_check(
            &["return items;", "sendToWarehouse"],
            &["trackEvent"],
        ));

        let violations = validate(&doc, &rules);
        assert_eq!(
            violations.iter().map(|v| v.kind.clone()).collect::<Vec<_>>(),
            vec![
                ViolationKind::FieldContent {
                    node_id: "analytics".to_string(),
                    path: "parameters.jsCode".to_string(),
                    fragment: "sendToWarehouse".to_string(),
                    expected_present: true,
                },
                ViolationKind::FieldContent {
                    node_id: "analytics".to_string(),
                    path: "parameters.jsCode".to_string(),
                    fragment: "trackEvent".to_string(),
                    expected_present: false,
                },
            ]
        );
    }

    #[test]
    fn test_field_check_on_missing_node_or_field() {
        let mut doc = load_clinic_bot();
        doc.remove_nodes_not_in(CLINIC_BOT_IDS.iter().filter(|id| **id != "analytics"));
        doc.set_connection("Send Reply", MAIN, vec![]);

        let mut check = analytics_check(&["x"], &[]);
        let rules = ValidationRules::new().field_check(check.clone());
        let violations = validate(&doc, &rules);
        assert_eq!(kinds(&violations), vec!["field-unavailable"]);

        check.node_id = "intent-router".to_string();
        check.path = path("parameters.rules");
        let violations = validate(&doc, &ValidationRules::new().field_check(check));
        assert!(violations[0].to_string().contains("not a string"));
    }
}

#[cfg(test)]
mod rule_file_tests {
    use super::*;

    const RULES_JSON: &str = r#"{
      "routers": [
        { "node": "Intent Router", "outcomes": 4,
          "targets": ["Book Appointment", "Book Appointment", "AI Agent", "AI Agent"] }
      ],
      "expected_edges": [
        { "source": "Webhook", "target": "Extract Data" },
        { "source": "Intent Router", "target": "AI Agent", "branch": 3, "severity": "warning" }
      ],
      "side_channels": [
        { "consumer": "AI Agent", "provider": "OpenAI Chat Model", "kind": "ai_languageModel" }
      ],
      "field_checks": [
        { "node_id": "analytics", "path": "parameters.jsCode", "absent": ["trackEvent"],
          "severity": "warning" }
      ]
    }"#;

    #[test]
    fn test_parse_rule_file() {
        let rules = ValidationRules::from_json_str(RULES_JSON).expect("Failed to parse rules");
        assert_eq!(rules.routers.len(), 1);
        assert_eq!(rules.expected_edges[1].branch, 3);
        assert_eq!(rules.expected_edges[1].severity, Some(Severity::Warning));
        assert_eq!(rules.field_checks[0].path, path("parameters.jsCode"));
    }

    #[test]
    fn test_rule_file_against_clinic_bot() {
        let doc = load_clinic_bot();
        let rules = ValidationRules::from_json_str(RULES_JSON).unwrap();
        let violations = validate(&doc, &rules);

        assert_eq!(kinds(&violations), vec!["field-content"]);
        assert!(!has_errors(&violations));
    }

    #[test]
    fn test_invalid_rule_file() {
        let err = ValidationRules::from_json_str(r#"{ "routers": [{ "node": "X" }] }"#).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDefinition { .. }));
    }
}

#[cfg(test)]
mod stats_tests {
    use super::*;

    #[test]
    fn test_graph_stats() {
        let stats = GraphStats::from_document(&load_clinic_bot());
        assert_eq!(stats.nodes, 9);
        assert_eq!(stats.sources, 8);
        assert_eq!(stats.edges, 11);
        assert_eq!(stats.edges_by_kind.get("main"), Some(&9));
        assert_eq!(stats.edges_by_kind.get("ai_memory"), Some(&1));
    }

    #[test]
    fn test_report_verdict() {
        let doc = load_clinic_bot();
        let stats = GraphStats::from_document(&doc);

        let report = ReportFormatter::format_report(&stats, &validate(&doc, &clinic_bot_rules()));
        assert!(report.contains("Validation PASSED"));

        let failing = ValidationRules::new().router("Intent Router", 5);
        let report = ReportFormatter::format_report(&stats, &validate(&doc, &failing));
        assert!(report.contains("Errors (1):"));
        assert!(report.contains("[branch-count-mismatch]"));
        assert!(report.contains("Validation FAILED"));
    }
}
