use super::{Interrupt, RuleKind, RuleReport};
use crate::data::LogEntry;
use crate::error::SourceError;
use crate::outcome::{Failure, FailureKind, ValidationOutcome};
use crate::resolve::{PortResolver, ResolveError};
use crate::source::RelationalSource;
use tracing::{debug, info};

/// The generator's description for a port it could not map. Compared verbatim.
pub const PORT_UNAVAILABLE_SENTINEL: &str =
    "THE PORT IS NOT AVAILABLE IN THE CURRENT LIBRARY AND THEREFORE CANNOT BE EVALUATED!!!";

pub(crate) fn check(
    source: &dyn RelationalSource,
    run_id: &str,
    interrupt: &Interrupt,
) -> Result<RuleReport, SourceError> {
    let entries = source.log_entries(run_id)?;
    info!(run_id, entries = entries.len(), "validating log entries");

    let resolver = PortResolver::new(source);
    let mut report = RuleReport::new(RuleKind::LogConsistency, run_id);
    for entry in &entries {
        if interrupt.is_triggered() {
            report.interrupted = true;
            break;
        }
        report.outcomes.push(check_entry(source, &resolver, entry)?);
    }
    Ok(report.finish())
}

fn check_entry(
    source: &dyn RelationalSource,
    resolver: &PortResolver<'_>,
    entry: &LogEntry,
) -> Result<ValidationOutcome, SourceError> {
    let subject = format!(
        "Diagram: {}, Block: {}, Port: {}",
        entry.diagram_name, entry.block_name, entry.instance_port
    );

    let reference = match resolver.resolve(&entry.diagram_name, &entry.instance_port) {
        Ok(reference) => reference,
        Err(ResolveError::Source(err)) => return Err(err),
        Err(ResolveError::Malformed(err)) => {
            return Ok(ValidationOutcome::fail(
                subject,
                Failure::new(FailureKind::InputMalformed, err.to_string()),
            ));
        }
        Err(ResolveError::AmbiguousBlockType { candidates, .. }) => {
            return Ok(ValidationOutcome::fail(
                subject,
                Failure::ambiguous("block type", candidates),
            ));
        }
    };

    let mapping_exists = match &reference.block_type {
        Some(block_type) => !source
            .mappings_by_port(block_type, &reference.port_name)?
            .is_empty(),
        None => false,
    };
    debug!(
        port = %reference.describe(),
        block_type = reference.block_type.as_deref().unwrap_or("<unresolved>"),
        mapping_exists,
        "checked log entry"
    );
    Ok(judge(subject, mapping_exists, &entry.description))
}

/// A mapping must exist exactly when the description is not the sentinel.
pub fn judge(subject: String, mapping_exists: bool, description: &str) -> ValidationOutcome {
    let flagged_unavailable = description == PORT_UNAVAILABLE_SENTINEL;
    match (mapping_exists, flagged_unavailable) {
        (true, false) | (false, true) => ValidationOutcome::pass(subject),
        (true, true) => ValidationOutcome::fail(
            subject,
            Failure::new(
                FailureKind::Inconsistent,
                "Mapping found, but description is incorrect.",
            ),
        ),
        (false, false) => ValidationOutcome::fail(
            subject,
            Failure::new(
                FailureKind::Inconsistent,
                "No mapping found, but description is incorrect.",
            ),
        ),
    }
}
