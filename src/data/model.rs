use serde::{Deserialize, Serialize};

/// One row of `log_summary` for a validation run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub diagram_name: String,
    /// The generator's block column (`mito_block`), reported as-is.
    pub block_name: String,
    /// Composite `block/port` token.
    pub instance_port: String,
    pub description: String,
}

/// A port addressed by diagram, block and port, with the declared type of its block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortReference {
    pub diagram_name: String,
    pub block_name: String,
    pub port_name: String,
    /// `None` when the parameter table has no row for the port.
    pub block_type: Option<String>,
}

impl PortReference {
    pub fn describe(&self) -> String {
        format!(
            "Diagram: {}, Block: {}, Port: {}",
            self.diagram_name, self.block_name, self.port_name
        )
    }
}

/// One row of `function_mapping_info`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionMapping {
    pub source_symbol: String,
    pub source_port_id: String,
    /// May embed a numeric suffix, e.g. `PARAM12`.
    pub dest_param_id: Option<String>,
    pub generation_type: Option<String>,
    pub variant: Option<String>,
}

/// A full `diagram_parameter` row. The rules read projections of it
/// (`ConnectionRecord`, `BlockVariant`, block types); fixtures write it whole.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramParameter {
    pub diagram_name: String,
    pub block: String,
    pub i_o_name: String,
    pub port_name: Option<String>,
    pub block_type: Option<String>,
    pub source_port_id: Option<String>,
    pub interconnection: Option<String>,
    pub variant: Option<String>,
}

/// A `diagram_parameter` row carrying an interconnection reference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub diagram_name: String,
    pub block: String,
    pub port_name: String,
    pub block_type: Option<String>,
    /// The row's own `source_port_id` column. Shown in reports only; the
    /// classifier uses the port parsed from `interconnection`.
    pub source_port_id: Option<String>,
    pub interconnection: String,
}

impl ConnectionRecord {
    pub fn describe(&self) -> String {
        match &self.source_port_id {
            Some(source_port) => format!(
                "Diagram: {}, Block: {}, Port: {}, Source port: {}",
                self.diagram_name, self.block, self.port_name, source_port
            ),
            None => format!(
                "Diagram: {}, Block: {}, Port: {}",
                self.diagram_name, self.block, self.port_name
            ),
        }
    }
}

/// A `(block, variant)` pair from `diagram_parameter`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockVariant {
    pub block: String,
    pub variant: String,
}
