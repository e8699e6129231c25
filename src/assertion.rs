//! Structural assertions on a diagram document for one classified negation.

use crate::classify::CaseClassification;
use crate::diagram::{DiagramTree, NodeRef, tags};
use crate::outcome::{Failure, FailureKind};
use crate::parsing::digit_runs;
use itertools::Itertools;
use tracing::debug;

/// Infix of the `name@item` value that tags a negation instance.
pub const NEGATION_INFIX: &str = ".NEG.";

/// `<block>.NEG.<target_id>`
pub fn search_key(block: &str, target_id: &str) -> String {
    format!("{}{}{}", block, NEGATION_INFIX, target_id)
}

/// Locates the block and port a negation lands on and checks that the port
/// carries the structure its case demands. Stops at the first miss.
pub fn assert_negation(
    tree: &DiagramTree,
    block: &str,
    classification: &CaseClassification,
) -> Result<(), Failure> {
    let target_id = match classification {
        CaseClassification::Unresolved { dest_param_id } => {
            return Err(Failure::new(
                FailureKind::Unresolved,
                format!(
                    "no numeric id resolvable for block {} (dest_param_id {})",
                    block,
                    dest_param_id.as_deref().unwrap_or("<null>")
                ),
            ));
        }
        CaseClassification::Ambiguous { candidates } => {
            return Err(Failure::ambiguous(
                format!("target id for block {}", block),
                candidates,
            ));
        }
        CaseClassification::Connector { target_id, .. }
        | CaseClassification::DirectConnection { target_id } => target_id.as_str(),
    };

    let key = search_key(block, target_id);
    let block_node = locate_block(tree, block, &key)?;
    let port_node = locate_port(tree, block_node, block, target_id)?;
    debug!(block, key = %key, "located negation port");

    if classification.is_case_ii() {
        if !tree.has_path(port_node, &[tags::CONNECTION]) {
            return Err(Failure::new(
                FailureKind::StructuralMismatch,
                format!(
                    "[Case II] Block {}: expected direct connection (<{}> under port {})",
                    block,
                    tags::CONNECTION,
                    target_id
                ),
            ));
        }
    } else if !tree.has_path(port_node, &[tags::SIGNAL_DEFINITION, tags::CONNECTOR]) {
        return Err(Failure::new(
            FailureKind::StructuralMismatch,
            format!(
                "[Case I] Block {}: expected connector (<{} {}> under port {})",
                block,
                tags::SIGNAL_DEFINITION,
                tags::CONNECTOR,
                target_id
            ),
        ));
    }
    Ok(())
}

/// The single block node owning a name leaf whose `item` ends with `key`.
fn locate_block(tree: &DiagramTree, block: &str, key: &str) -> Result<NodeRef, Failure> {
    let names = tree.find_by_attribute_suffix(tags::NAME, tags::NAME_ITEM, key);
    let blocks: Vec<NodeRef> = names
        .iter()
        .filter_map(|&name| tree.nearest_ancestor_of_kind(name, tags::BLOCK))
        .unique()
        .collect();

    match blocks.as_slice() {
        [] => Err(Failure::not_found(format!(
            "block {} with negation {}",
            block, key
        ))),
        [single] => Ok(*single),
        _ => Err(Failure::ambiguous(
            format!("block for negation {}", key),
            names
                .iter()
                .filter_map(|&name| tree.attribute(name, tags::NAME_ITEM)),
        )),
    }
}

/// The single port under `block_node` whose identifier contains `target_id`.
///
/// When several ports contain the id as a substring, ports whose identifier
/// has it as a whole digit run win.
fn locate_port(
    tree: &DiagramTree,
    block_node: NodeRef,
    block: &str,
    target_id: &str,
) -> Result<NodeRef, Failure> {
    let candidates: Vec<(NodeRef, String)> = tree
        .find_by_contained_text(
            block_node,
            &[tags::PORT_IDENTIFIER, tags::PORT_ID],
            target_id,
        )
        .into_iter()
        .filter_map(|id_node| {
            tree.closest(id_node, tags::PORT)
                .map(|port| (port, tree.text_content(id_node)))
        })
        .unique_by(|(port, _)| *port)
        .collect();

    let chosen: Vec<&(NodeRef, String)> = if candidates.len() > 1 {
        let exact: Vec<_> = candidates
            .iter()
            .filter(|(_, id_text)| digit_runs(id_text).any(|run| run == target_id))
            .collect();
        if exact.is_empty() {
            candidates.iter().collect()
        } else {
            exact
        }
    } else {
        candidates.iter().collect()
    };

    match chosen.as_slice() {
        [] => Err(Failure::not_found(format!(
            "port {} in block {}",
            target_id, block
        ))),
        [(port, _)] => Ok(*port),
        many => Err(Failure::ambiguous(
            format!("port {} in block {}", target_id, block),
            many.iter().map(|(_, id_text)| id_text.trim()),
        )),
    }
}
