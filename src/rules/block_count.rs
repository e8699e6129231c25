use super::{Interrupt, RuleKind, RuleReport};
use crate::data::BlockVariant;
use crate::diagram::tags;
use crate::error::SourceError;
use crate::outcome::{Failure, FailureKind, ValidationOutcome};
use crate::source::{DiagramSource, RelationalSource};
use ahash::AHashMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Variants ending in this suffix are compound-component candidates.
pub const COMPOUND_VARIANT_SUFFIX: &str = "_CC";
/// `generation_type` marking a mapping as a compound component.
pub const COMPOUND_GENERATION_TYPE: &str = "Compound Component";

pub(crate) fn check(
    relational: &dyn RelationalSource,
    diagrams: &dyn DiagramSource,
    diagram: &str,
    interrupt: &Interrupt,
) -> Result<RuleReport, SourceError> {
    let tree = diagrams.diagram(diagram)?;
    let leaf_blocks = tree.count(tags::BLOCK);
    let compounds = tree.count(tags::COMPOUND);
    let expected_total = relational.block_count(diagram)?;

    let mut report = RuleReport::new(RuleKind::BlockCount, diagram);
    report
        .outcomes
        .push(compare_total(diagram, expected_total, leaf_blocks, compounds));

    if interrupt.is_triggered() {
        report.interrupted = true;
        return Ok(report.finish());
    }

    let expected_compounds = derive_compound_count(relational, diagram)?;
    report
        .outcomes
        .push(compare_compounds(diagram, expected_compounds, compounds));
    Ok(report.finish())
}

/// Database block rows against leaf blocks plus compound nodes in the document.
pub fn compare_total(
    diagram: &str,
    expected: usize,
    leaf_blocks: usize,
    compounds: usize,
) -> ValidationOutcome {
    let subject = format!("Diagram: {}, total block count", diagram);
    let actual = leaf_blocks + compounds;
    if expected == actual {
        ValidationOutcome::pass(subject)
    } else {
        ValidationOutcome::fail(
            subject,
            Failure::new(
                FailureKind::CountMismatch,
                format!(
                    "block count mismatch: expected {}, actual {} ({} blocks + {} compound nodes)",
                    expected, actual, leaf_blocks, compounds
                ),
            ),
        )
    }
}

pub fn compare_compounds(diagram: &str, expected: usize, actual: usize) -> ValidationOutcome {
    let subject = format!("Diagram: {}, compound count", diagram);
    if expected == actual {
        ValidationOutcome::pass(subject)
    } else {
        ValidationOutcome::fail(
            subject,
            Failure::new(
                FailureKind::CountMismatch,
                format!(
                    "compound count mismatch: expected {}, actual {}",
                    expected, actual
                ),
            ),
        )
    }
}

/// Distinct `(block, variant)` pairs whose variant ends with `_CC`, in sorted order.
pub fn compound_candidates(rows: Vec<BlockVariant>) -> BTreeSet<BlockVariant> {
    rows.into_iter()
        .filter(|row| row.variant.ends_with(COMPOUND_VARIANT_SUFFIX))
        .collect()
}

/// Counts candidates with at least one mapping row of generation type
/// "Compound Component". Counting is per candidate, so duplicate mapping rows
/// for a variant never add up.
pub fn derive_compound_count(
    relational: &dyn RelationalSource,
    diagram: &str,
) -> Result<usize, SourceError> {
    let candidates = compound_candidates(relational.block_variants(diagram)?);
    let mut is_compound: AHashMap<String, bool> = AHashMap::new();
    let mut count = 0;
    for candidate in &candidates {
        let compound = match is_compound.get(&candidate.variant) {
            Some(&known) => known,
            None => {
                let known = relational
                    .mappings_by_variant(&candidate.variant)?
                    .iter()
                    .any(|m| m.generation_type.as_deref() == Some(COMPOUND_GENERATION_TYPE));
                is_compound.insert(candidate.variant.clone(), known);
                known
            }
        };
        if compound {
            count += 1;
        }
    }
    debug!(
        diagram,
        candidates = candidates.len(),
        compounds = count,
        "derived compound count"
    );
    Ok(count)
}
