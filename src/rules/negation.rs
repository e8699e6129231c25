use super::{Interrupt, RuleKind, RuleReport};
use crate::assertion::assert_negation;
use crate::classify::{CaseClassifier, ClassificationRequest};
use crate::data::ConnectionRecord;
use crate::diagram::DiagramTree;
use crate::error::SourceError;
use crate::outcome::{Failure, FailureKind, ValidationOutcome};
use crate::parsing::{NEGATION_MARKER, parse_interconnection};
use crate::source::{DiagramSource, RelationalSource};
use tracing::{debug, info, warn};

pub(crate) fn check(
    relational: &dyn RelationalSource,
    diagrams: &dyn DiagramSource,
    diagram: &str,
    interrupt: &Interrupt,
) -> Result<RuleReport, SourceError> {
    let records: Vec<ConnectionRecord> = relational
        .connection_records(diagram)?
        .into_iter()
        .filter(|record| record.interconnection.contains(NEGATION_MARKER))
        .collect();

    let mut report = RuleReport::new(RuleKind::NegationWiring, diagram);
    if records.is_empty() {
        info!(diagram, "no negation connections found to test");
        return Ok(report.finish());
    }

    let tree = diagrams.diagram(diagram)?;
    let classifier = CaseClassifier::new(relational);
    info!(diagram, records = records.len(), "validating negation connections");
    for record in &records {
        if interrupt.is_triggered() {
            report.interrupted = true;
            break;
        }
        report
            .outcomes
            .push(check_record(&classifier, &tree, record)?);
    }
    Ok(report.finish())
}

/// Parse, classify, then assert. A record that fails to parse is not classified.
pub fn check_record(
    classifier: &CaseClassifier<'_>,
    tree: &DiagramTree,
    record: &ConnectionRecord,
) -> Result<ValidationOutcome, SourceError> {
    let subject = record.describe();

    let parsed = match parse_interconnection(&record.interconnection) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(text = %err.text(), "invalid interconnection format");
            return Ok(ValidationOutcome::fail(
                subject,
                Failure::new(FailureKind::InputMalformed, err.to_string()),
            ));
        }
    };

    let classification = classifier.classify(&ClassificationRequest {
        block_type: record.block_type.as_deref(),
        source_port_id: &parsed.source_port_id,
        block: &record.block,
        port_name: &record.port_name,
    })?;
    let source = format!(
        "{}\\{}.{}",
        parsed.source_diagram, parsed.source_block, parsed.source_port_id
    );
    debug!(
        block = %record.block,
        source = %source,
        classification = %classification,
        "classified negation"
    );

    Ok(match assert_negation(tree, &record.block, &classification) {
        Ok(()) => ValidationOutcome::pass(subject),
        Err(failure) => ValidationOutcome::fail(subject, failure),
    })
}
