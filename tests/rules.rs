//! End-to-end tests of the three rules through `Validator`, over in-memory sources.
mod common;
use common::*;
use shogo::data::{BlockVariant, ConnectionRecord, FunctionMapping, LogEntry};
use shogo::prelude::*;
use shogo::rules::block_count::{compare_total, compound_candidates};
use shogo::rules::log_consistency::judge;
use shogo::rules::{COMPOUND_GENERATION_TYPE, PORT_UNAVAILABLE_SENTINEL};
use std::cell::Cell;
use std::result::Result;

#[cfg(test)]
mod log_consistency_tests {
    use super::*;

    fn run(relational: &MemoryRelational) -> RuleReport {
        let diagrams = MemoryDiagrams::new();
        Validator::new(relational, &diagrams)
            .check_log_consistency(RUN_ID)
            .unwrap()
    }

    #[test]
    fn test_sentinel_without_mapping_passes() {
        let relational = MemoryRelational::new()
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_MOTOR")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL));

        let report = run(&relational);
        assert_eq!(report.rule, RuleKind::LogConsistency);
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.passed());
    }

    #[test]
    fn test_description_with_mapping_passes() {
        let relational = MemoryRelational::new()
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_MOTOR")))
            .with_mapping(mapping("FB_MOTOR", "IN", Some("PARAM1")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", "Mapped to PARAM1"));

        assert!(run(&relational).passed());
    }

    #[test]
    fn test_sentinel_with_mapping_fails() {
        let relational = MemoryRelational::new()
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_MOTOR")))
            .with_mapping(mapping("FB_MOTOR", "IN", Some("PARAM1")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL));

        let report = run(&relational);
        let outcome = &report.outcomes[0];
        assert_eq!(
            failure_reason(outcome),
            "Mapping found, but description is incorrect."
        );
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Inconsistent));
        assert_eq!(
            outcome.subject,
            format!("Diagram: {}, Block: MOT_01, Port: MOT_01/IN", DIAGRAM)
        );
    }

    #[test]
    fn test_description_without_mapping_fails() {
        let relational = MemoryRelational::new()
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_MOTOR")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", "Mapped to PARAM1"));

        let report = run(&relational);
        assert_eq!(
            failure_reason(&report.outcomes[0]),
            "No mapping found, but description is incorrect."
        );
    }

    #[test]
    fn test_sentinel_match_is_case_sensitive() {
        let relational = MemoryRelational::new().with_log(
            RUN_ID,
            log_entry("MOT_01", "IN", &PORT_UNAVAILABLE_SENTINEL.to_lowercase()),
        );
        assert!(!run(&relational).passed());
    }

    #[test]
    fn test_unresolved_block_type_means_no_mapping() {
        // A mapping keyed by the port alone must not be found without a type.
        let relational = MemoryRelational::new()
            .with_mapping(mapping("", "IN", Some("PARAM1")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL));
        assert!(run(&relational).passed());
    }

    #[test]
    fn test_malformed_instance_port_fails_only_that_row() {
        let mut bad = log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL);
        bad.instance_port = "MOT_01-IN".to_string();
        let relational = MemoryRelational::new()
            .with_log(RUN_ID, bad)
            .with_log(RUN_ID, log_entry("MOT_02", "IN", PORT_UNAVAILABLE_SENTINEL));

        let report = run(&relational);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.outcomes[0].failure_kind(),
            Some(FailureKind::InputMalformed)
        );
        assert!(report.outcomes[1].passed());
    }

    #[test]
    fn test_conflicting_block_types_are_ambiguous() {
        let relational = MemoryRelational::new()
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_MOTOR")))
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_VALVE")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL));

        let report = run(&relational);
        let reason = failure_reason(&report.outcomes[0]);
        assert!(reason.starts_with("ambiguous block type"));
        assert!(reason.contains("FB_MOTOR"));
        assert!(reason.contains("FB_VALVE"));
    }

    #[test]
    fn test_other_runs_are_ignored() {
        let relational = MemoryRelational::new()
            .with_log("another run", log_entry("MOT_01", "IN", "Mapped"));
        let report = run(&relational);
        assert!(report.outcomes.is_empty());
        assert!(report.passed());
    }

    #[test]
    fn test_judge_is_the_biconditional() {
        assert!(judge("s".into(), true, "Mapped").passed());
        assert!(judge("s".into(), false, PORT_UNAVAILABLE_SENTINEL).passed());
        assert!(!judge("s".into(), true, PORT_UNAVAILABLE_SENTINEL).passed());
        assert!(!judge("s".into(), false, "Mapped").passed());
    }
}

#[cfg(test)]
mod negation_wiring_tests {
    use super::*;

    /// Scenario C and D share this record: `-" "DiagA\BlockX.Port7` on port `OUT`.
    fn record() -> shogo::data::DiagramParameter {
        connection_parameter(
            "BlockX",
            Some("FB_AND"),
            "OUT",
            &interconnection("DiagA", "BlockX", "Port7"),
        )
    }

    #[test]
    fn test_case_ii_direct_connection() {
        let relational = MemoryRelational::new()
            .with_parameter(record())
            .with_mapping(mapping("FB_AND", "Port7", Some("PARAM12")));
        let diagrams = diagrams_with(&[block_xml("BlockX", "12", "12", Wiring::Direct)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.passed(), "{:?}", report.outcomes);
    }

    #[test]
    fn test_subject_names_the_row_source_port() {
        let parameter = shogo::data::DiagramParameter {
            source_port_id: Some("Port7".to_string()),
            ..record()
        };
        let relational = MemoryRelational::new()
            .with_parameter(parameter)
            .with_mapping(mapping("FB_AND", "Port7", Some("PARAM12")));
        let diagrams = diagrams_with(&[block_xml("BlockX", "12", "12", Wiring::Direct)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert_eq!(
            report.outcomes[0].subject,
            format!("Diagram: {}, Block: BlockX, Port: OUT, Source port: Port7", DIAGRAM)
        );
    }

    #[test]
    fn test_case_ii_rejects_connector() {
        let relational = MemoryRelational::new()
            .with_parameter(record())
            .with_mapping(mapping("FB_AND", "Port7", Some("PARAM12")));
        let diagrams = diagrams_with(&[block_xml("BlockX", "12", "12", Wiring::Connector)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        let reason = failure_reason(&report.outcomes[0]);
        assert!(reason.contains("expected direct connection"));
    }

    #[test]
    fn test_case_i_from_generated_artifact() {
        let relational = MemoryRelational::new()
            .with_parameter(record())
            .with_generated_port("BlockX", "P_5_OUT");
        let diagrams = diagrams_with(&[block_xml("BlockX", "5", "5", Wiring::Connector)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert!(report.passed(), "{:?}", report.outcomes);
    }

    #[test]
    fn test_case_i_rejects_direct_connection() {
        let relational = MemoryRelational::new()
            .with_parameter(record())
            .with_generated_port("BlockX", "P_5_OUT");
        let diagrams = diagrams_with(&[block_xml("BlockX", "5", "5", Wiring::Direct)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert!(failure_reason(&report.outcomes[0]).contains("expected connector"));
    }

    #[test]
    fn test_default_id_is_used_as_last_resort() {
        let relational = MemoryRelational::new().with_parameter(record());
        let diagrams = diagrams_with(&[block_xml("BlockX", "10", "10", Wiring::Connector)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert!(report.passed(), "{:?}", report.outcomes);
    }

    #[test]
    fn test_malformed_interconnection_fails_without_lookup() {
        let relational = MemoryRelational::new()
            .with_parameter(connection_parameter(
                "BlockX",
                Some("FB_AND"),
                "OUT",
                r#"-" "DiagA/BlockX.Port7"#,
            ))
            .with_parameter(record())
            .with_mapping(mapping("FB_AND", "Port7", Some("PARAM12")));
        let diagrams = diagrams_with(&[block_xml("BlockX", "12", "12", Wiring::Direct)]);

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.outcomes[0].failure_kind(),
            Some(FailureKind::InputMalformed)
        );
        assert!(failure_reason(&report.outcomes[0]).contains(r#"-" "DiagA/BlockX.Port7"#));
        assert!(report.outcomes[1].passed());
    }

    #[test]
    fn test_only_negated_interconnections_are_checked() {
        let relational = MemoryRelational::new().with_parameter(connection_parameter(
            "BlockX",
            Some("FB_AND"),
            "OUT",
            r#"" "DiagA\BlockX.Port7"#,
        ));
        // No document is registered: it must not be loaded when there is nothing to check.
        let diagrams = MemoryDiagrams::new();

        let report = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert!(report.outcomes.is_empty());
        assert!(report.passed());
    }

    #[test]
    fn test_missing_document_is_fatal() {
        let relational = MemoryRelational::new().with_parameter(record());
        let diagrams = MemoryDiagrams::new();

        let err = Validator::new(&relational, &diagrams)
            .check_negation_wiring(DIAGRAM)
            .unwrap_err();
        assert_eq!(err, SourceError::DiagramNotFound(DIAGRAM.to_string()));
    }
}

#[cfg(test)]
mod block_count_tests {
    use super::*;

    fn relational_with_blocks(count: usize) -> MemoryRelational {
        (0..count).fold(MemoryRelational::new(), |source, i| {
            source.with_block(DIAGRAM, &format!("B{}", i))
        })
    }

    fn document(leaves: usize, compounds: usize) -> MemoryDiagrams {
        let mut children: Vec<String> = (0..leaves)
            .map(|i| plain_block_xml(&format!("B{}", i)))
            .collect();
        children.extend((0..compounds).map(|i| compound_xml(&format!("C{}", i))));
        diagrams_with(&children)
    }

    #[test]
    fn test_total_count_matches() {
        let relational = relational_with_blocks(10);
        let diagrams = document(7, 3);
        let report = Validator::new(&relational, &diagrams)
            .check_block_counts(DIAGRAM)
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes[0].passed());
    }

    #[test]
    fn test_total_count_mismatch_names_both_numbers() {
        let relational = relational_with_blocks(10);
        let diagrams = document(7, 2);
        let report = Validator::new(&relational, &diagrams)
            .check_block_counts(DIAGRAM)
            .unwrap();

        let reason = failure_reason(&report.outcomes[0]);
        assert!(reason.contains("expected 10"));
        assert!(reason.contains("actual 9"));
        assert_eq!(
            report.outcomes[0].failure_kind(),
            Some(FailureKind::CountMismatch)
        );
    }

    #[test]
    fn test_compound_count_is_derived_through_mappings() {
        let relational = relational_with_blocks(3)
            .with_parameter(variant_parameter("CC1", "MIX_CC"))
            .with_parameter(variant_parameter("CC2", "HEAT_CC"))
            .with_parameter(variant_parameter("CC3", "PLAIN_CC"))
            .with_parameter(variant_parameter("B0", "MOTOR"))
            .with_mapping(compound_mapping("MIX_CC", COMPOUND_GENERATION_TYPE))
            .with_mapping(compound_mapping("MIX_CC", COMPOUND_GENERATION_TYPE))
            .with_mapping(compound_mapping("HEAT_CC", "Function Block"))
            .with_mapping(compound_mapping("HEAT_CC", COMPOUND_GENERATION_TYPE))
            .with_mapping(compound_mapping("PLAIN_CC", "Function Block"))
            .with_mapping(compound_mapping("MOTOR", COMPOUND_GENERATION_TYPE));
        let diagrams = document(1, 2);

        let report = Validator::new(&relational, &diagrams)
            .check_block_counts(DIAGRAM)
            .unwrap();
        assert!(report.passed(), "{:?}", report.outcomes);
    }

    #[test]
    fn test_compound_count_mismatch() {
        let relational = relational_with_blocks(3)
            .with_parameter(variant_parameter("CC1", "MIX_CC"))
            .with_mapping(compound_mapping("MIX_CC", COMPOUND_GENERATION_TYPE));
        let diagrams = document(1, 2);

        let report = Validator::new(&relational, &diagrams)
            .check_block_counts(DIAGRAM)
            .unwrap();
        assert!(report.outcomes[0].passed());
        assert_eq!(
            failure_reason(&report.outcomes[1]),
            "compound count mismatch: expected 1, actual 2"
        );
    }

    #[test]
    fn test_duplicate_candidates_count_once() {
        let candidates = compound_candidates(vec![
            BlockVariant {
                block: "CC1".to_string(),
                variant: "MIX_CC".to_string(),
            },
            BlockVariant {
                block: "CC1".to_string(),
                variant: "MIX_CC".to_string(),
            },
            BlockVariant {
                block: "B1".to_string(),
                variant: "MIX_CCX".to_string(),
            },
        ]);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_compare_total_reason() {
        let outcome = compare_total(DIAGRAM, 10, 7, 2);
        assert_eq!(
            outcome.reason(),
            Some("block count mismatch: expected 10, actual 9 (7 blocks + 2 compound nodes)")
        );
    }
}

#[cfg(test)]
mod validator_tests {
    use super::*;

    #[test]
    fn test_check_all_runs_every_rule_in_order() {
        let relational = MemoryRelational::new()
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL))
            .with_block(DIAGRAM, "B0");
        let diagrams = diagrams_with(&[plain_block_xml("B0")]);

        let reports = Validator::new(&relational, &diagrams)
            .check_all(Some(RUN_ID), &[DIAGRAM.to_string()])
            .unwrap();
        let rules: Vec<RuleKind> = reports.iter().map(|r| r.rule).collect();
        assert_eq!(
            rules,
            vec![
                RuleKind::LogConsistency,
                RuleKind::NegationWiring,
                RuleKind::BlockCount
            ]
        );
        assert!(reports.iter().all(RuleReport::passed));
    }

    #[test]
    fn test_cancelled_interrupt_stops_between_records() {
        let relational = MemoryRelational::new()
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL))
            .with_log(RUN_ID, log_entry("MOT_02", "IN", PORT_UNAVAILABLE_SENTINEL));
        let diagrams = MemoryDiagrams::new();
        let interrupt = Interrupt::new();
        interrupt.cancel();

        let report = Validator::new(&relational, &diagrams)
            .with_interrupt(interrupt.clone())
            .check_log_consistency(RUN_ID)
            .unwrap();
        assert!(report.interrupted);
        assert!(report.outcomes.is_empty());
        assert!(interrupt.is_triggered());
    }

    #[test]
    fn test_check_all_skips_diagrams_after_interrupt() {
        let relational = MemoryRelational::new();
        let diagrams = MemoryDiagrams::new();
        let interrupt = Interrupt::new().with_budget(std::time::Duration::ZERO);

        let reports = Validator::new(&relational, &diagrams)
            .with_interrupt(interrupt)
            .check_all(Some(RUN_ID), &[DIAGRAM.to_string()])
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].interrupted || reports[0].outcomes.is_empty());
    }

    #[test]
    fn test_fresh_interrupt_is_not_triggered() {
        assert!(!Interrupt::new().is_triggered());
    }
}

/// Query that cancels the run when it has been issued `after` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    ParameterBlockTypes,
    MappingsByPort,
    BlockCount,
}

/// Wraps a relational source and cancels an interrupt from inside a query,
/// the way a caller on another thread would mid-run.
struct CancellingSource {
    inner: MemoryRelational,
    interrupt: Interrupt,
    query: Query,
    after: usize,
    calls: Cell<usize>,
}

impl CancellingSource {
    fn new(inner: MemoryRelational, interrupt: &Interrupt, query: Query, after: usize) -> Self {
        Self {
            inner,
            interrupt: interrupt.clone(),
            query,
            after,
            calls: Cell::new(0),
        }
    }

    fn record(&self, query: Query) {
        if query != self.query {
            return;
        }
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() == self.after {
            self.interrupt.cancel();
        }
    }
}

impl RelationalSource for CancellingSource {
    fn log_entries(&self, run_id: &str) -> Result<Vec<LogEntry>, SourceError> {
        self.inner.log_entries(run_id)
    }

    fn parameter_block_types(
        &self,
        diagram: &str,
        block: &str,
        port: &str,
    ) -> Result<Vec<Option<String>>, SourceError> {
        self.record(Query::ParameterBlockTypes);
        self.inner.parameter_block_types(diagram, block, port)
    }

    fn connection_records(&self, diagram: &str) -> Result<Vec<ConnectionRecord>, SourceError> {
        self.inner.connection_records(diagram)
    }

    fn mappings_by_port(
        &self,
        symbol: &str,
        port_id: &str,
    ) -> Result<Vec<FunctionMapping>, SourceError> {
        self.record(Query::MappingsByPort);
        self.inner.mappings_by_port(symbol, port_id)
    }

    fn mappings_by_variant(&self, variant: &str) -> Result<Vec<FunctionMapping>, SourceError> {
        self.inner.mappings_by_variant(variant)
    }

    fn generated_ports(
        &self,
        block: &str,
        port_fragment: &str,
    ) -> Result<Vec<String>, SourceError> {
        self.inner.generated_ports(block, port_fragment)
    }

    fn block_count(&self, diagram: &str) -> Result<usize, SourceError> {
        self.record(Query::BlockCount);
        self.inner.block_count(diagram)
    }

    fn block_variants(&self, diagram: &str) -> Result<Vec<BlockVariant>, SourceError> {
        self.inner.block_variants(diagram)
    }
}

#[cfg(test)]
mod partial_run_tests {
    use super::*;

    #[test]
    fn test_log_rule_keeps_outcomes_checked_before_cancel() {
        let relational = ["MOT_01", "MOT_02", "MOT_03"]
            .iter()
            .fold(MemoryRelational::new(), |source, block| {
                source
                    .with_parameter(typed_port(block, "IN", Some("FB_MOTOR")))
                    .with_log(RUN_ID, log_entry(block, "IN", PORT_UNAVAILABLE_SENTINEL))
            });
        let interrupt = Interrupt::new();
        let source = CancellingSource::new(relational, &interrupt, Query::ParameterBlockTypes, 2);
        let diagrams = MemoryDiagrams::new();

        let report = Validator::new(&source, &diagrams)
            .with_interrupt(interrupt)
            .check_log_consistency(RUN_ID)
            .unwrap();
        assert!(report.interrupted);
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.passed());
    }

    #[test]
    fn test_negation_rule_keeps_outcomes_checked_before_cancel() {
        let blocks = ["BlockA", "BlockB", "BlockC"];
        let relational = blocks
            .iter()
            .fold(MemoryRelational::new(), |source, block| {
                source.with_parameter(connection_parameter(
                    block,
                    Some("FB_AND"),
                    "OUT",
                    &interconnection("DiagA", block, "Port7"),
                ))
            })
            .with_mapping(mapping("FB_AND", "Port7", Some("PARAM12")));
        let children: Vec<String> = blocks
            .iter()
            .map(|block| block_xml(block, "12", "12", Wiring::Direct))
            .collect();
        let diagrams = diagrams_with(&children);
        let interrupt = Interrupt::new();
        let source = CancellingSource::new(relational, &interrupt, Query::MappingsByPort, 1);

        let report = Validator::new(&source, &diagrams)
            .with_interrupt(interrupt)
            .check_negation_wiring(DIAGRAM)
            .unwrap();
        assert!(report.interrupted);
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.passed(), "{:?}", report.outcomes);
    }

    #[test]
    fn test_block_count_stops_between_comparisons() {
        let relational = MemoryRelational::new().with_block(DIAGRAM, "B0");
        let diagrams = diagrams_with(&[plain_block_xml("B0")]);
        let interrupt = Interrupt::new();
        let source = CancellingSource::new(relational, &interrupt, Query::BlockCount, 1);

        let report = Validator::new(&source, &diagrams)
            .with_interrupt(interrupt)
            .check_block_counts(DIAGRAM)
            .unwrap();
        assert!(report.interrupted);
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].passed());
    }

    #[test]
    fn test_check_all_skips_rules_after_cancel() {
        let relational = MemoryRelational::new()
            .with_parameter(typed_port("MOT_01", "IN", Some("FB_MOTOR")))
            .with_log(RUN_ID, log_entry("MOT_01", "IN", PORT_UNAVAILABLE_SENTINEL));
        let interrupt = Interrupt::new();
        let source = CancellingSource::new(relational, &interrupt, Query::ParameterBlockTypes, 1);
        let diagrams = diagrams_with(&[]);

        let reports = Validator::new(&source, &diagrams)
            .with_interrupt(interrupt)
            .check_all(Some(RUN_ID), &[DIAGRAM.to_string()])
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].rule, RuleKind::LogConsistency);
        assert_eq!(reports[0].outcomes.len(), 1);
    }
}
