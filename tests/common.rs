//! Common test utilities for building relational rows and diagram documents.
use shogo::data::{DiagramParameter, FunctionMapping, LogEntry};
use shogo::diagram::tags;
use shogo::prelude::*;

#[allow(dead_code)]
pub const DIAGRAM: &str = "=7BHA01GH001";
#[allow(dead_code)]
pub const RUN_ID: &str = "Import PCS7 Diagram-24-12-2025, 05:32 PM";

/// How a port is wired in a generated document.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Wiring {
    /// `<connection/>` under the port (Case II).
    Direct,
    /// `<sigdef><connector/></sigdef>` under the port (Case I).
    Connector,
    /// Neither marker.
    Bare,
}

/// A leaf block carrying one negation name leaf and one port.
///
/// `port_id` is the raw text of the port's `portId`, which lets tests place the
/// target id inside longer identifiers.
#[allow(dead_code)]
pub fn block_xml(block: &str, target_id: &str, port_id: &str, wiring: Wiring) -> String {
    let wiring = match wiring {
        Wiring::Direct => format!("<{}/>", tags::CONNECTION),
        Wiring::Connector => format!(
            "<{sig}><{con}/></{sig}>",
            sig = tags::SIGNAL_DEFINITION,
            con = tags::CONNECTOR
        ),
        Wiring::Bare => String::new(),
    };
    format!(
        "<afi><name item=\"{block}.NEG.{target_id}\"/><port><portIdentifier><portId>{port_id}</portId></portIdentifier>{wiring}</port></afi>"
    )
}

/// A leaf block with no negation, only counted.
#[allow(dead_code)]
pub fn plain_block_xml(name: &str) -> String {
    format!("<afi><name item=\"{name}\"/></afi>")
}

#[allow(dead_code)]
pub fn compound_xml(name: &str) -> String {
    format!("<cc><name item=\"{name}\"/></cc>")
}

/// Wraps elements into a document with a `diagram` root.
#[allow(dead_code)]
pub fn diagram_xml(children: &[String]) -> String {
    format!("<diagram name=\"{}\">{}</diagram>", DIAGRAM, children.concat())
}

/// `-" "<diagram>\<block>.<port>`
#[allow(dead_code)]
pub fn interconnection(source_diagram: &str, source_block: &str, source_port: &str) -> String {
    format!("-\" \"{}\\{}.{}", source_diagram, source_block, source_port)
}

/// A parameter row of `DIAGRAM` carrying an interconnection.
#[allow(dead_code)]
pub fn connection_parameter(
    block: &str,
    block_type: Option<&str>,
    port_name: &str,
    interconnection: &str,
) -> DiagramParameter {
    DiagramParameter {
        diagram_name: DIAGRAM.to_string(),
        block: block.to_string(),
        i_o_name: port_name.to_string(),
        port_name: Some(port_name.to_string()),
        block_type: block_type.map(str::to_string),
        interconnection: Some(interconnection.to_string()),
        ..Default::default()
    }
}

/// A parameter row of `DIAGRAM` declaring the type of `block`'s `port`.
#[allow(dead_code)]
pub fn typed_port(block: &str, port: &str, block_type: Option<&str>) -> DiagramParameter {
    DiagramParameter {
        diagram_name: DIAGRAM.to_string(),
        block: block.to_string(),
        i_o_name: port.to_string(),
        port_name: Some(port.to_string()),
        block_type: block_type.map(str::to_string),
        ..Default::default()
    }
}

/// A parameter row of `DIAGRAM` with a variant set.
#[allow(dead_code)]
pub fn variant_parameter(block: &str, variant: &str) -> DiagramParameter {
    DiagramParameter {
        diagram_name: DIAGRAM.to_string(),
        block: block.to_string(),
        i_o_name: "EN".to_string(),
        variant: Some(variant.to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn mapping(symbol: &str, port_id: &str, dest_param_id: Option<&str>) -> FunctionMapping {
    FunctionMapping {
        source_symbol: symbol.to_string(),
        source_port_id: port_id.to_string(),
        dest_param_id: dest_param_id.map(str::to_string),
        generation_type: Some("Function Block".to_string()),
        variant: None,
    }
}

#[allow(dead_code)]
pub fn compound_mapping(variant: &str, generation_type: &str) -> FunctionMapping {
    FunctionMapping {
        source_symbol: "CC_TYPE".to_string(),
        source_port_id: "EN".to_string(),
        dest_param_id: None,
        generation_type: Some(generation_type.to_string()),
        variant: Some(variant.to_string()),
    }
}

#[allow(dead_code)]
pub fn log_entry(block: &str, port: &str, description: &str) -> LogEntry {
    LogEntry {
        diagram_name: DIAGRAM.to_string(),
        block_name: block.to_string(),
        instance_port: format!("{}/{}", block, port),
        description: description.to_string(),
    }
}

/// A single-diagram document source, panicking on malformed fixture XML.
#[allow(dead_code)]
pub fn diagrams_with(children: &[String]) -> MemoryDiagrams {
    MemoryDiagrams::new()
        .with_diagram(DIAGRAM, &diagram_xml(children))
        .expect("fixture XML must parse")
}

#[allow(dead_code)]
pub fn failure_reason(outcome: &ValidationOutcome) -> &str {
    outcome.reason().expect("outcome should have failed")
}
