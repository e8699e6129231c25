use super::{DiagramSource, RelationalSource};
use crate::data::{BlockVariant, ConnectionRecord, DiagramParameter, FunctionMapping, LogEntry};
use crate::diagram::DiagramTree;
use crate::error::SourceError;
use ahash::AHashMap;
use std::rc::Rc;

/// Relational rows held in memory, answering the same intents as `MitoDatabase`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRelational {
    pub logs: Vec<(String, LogEntry)>,
    pub parameters: Vec<DiagramParameter>,
    pub mappings: Vec<FunctionMapping>,
    /// `(block, port)` rows of `temp_generated_artifact`.
    pub generated_ports: Vec<(String, String)>,
    /// `(diagram_name, block)` rows of `diagram_blocks`.
    pub blocks: Vec<(String, String)>,
}

impl MemoryRelational {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, run_id: &str, entry: LogEntry) -> Self {
        self.logs.push((run_id.to_string(), entry));
        self
    }

    pub fn with_parameter(mut self, parameter: DiagramParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_mapping(mut self, mapping: FunctionMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn with_generated_port(mut self, block: &str, port: &str) -> Self {
        self.generated_ports
            .push((block.to_string(), port.to_string()));
        self
    }

    pub fn with_block(mut self, diagram: &str, block: &str) -> Self {
        self.blocks.push((diagram.to_string(), block.to_string()));
        self
    }
}

impl RelationalSource for MemoryRelational {
    fn log_entries(&self, run_id: &str) -> Result<Vec<LogEntry>, SourceError> {
        Ok(self
            .logs
            .iter()
            .filter(|(run, _)| run == run_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn parameter_block_types(
        &self,
        diagram: &str,
        block: &str,
        port: &str,
    ) -> Result<Vec<Option<String>>, SourceError> {
        Ok(self
            .parameters
            .iter()
            .filter(|p| p.diagram_name == diagram && p.block == block && p.i_o_name == port)
            .map(|p| p.block_type.clone())
            .collect())
    }

    fn connection_records(&self, diagram: &str) -> Result<Vec<ConnectionRecord>, SourceError> {
        Ok(self
            .parameters
            .iter()
            .filter(|p| p.diagram_name == diagram)
            .filter_map(|p| {
                let interconnection = p.interconnection.clone()?;
                Some(ConnectionRecord {
                    diagram_name: p.diagram_name.clone(),
                    block: p.block.clone(),
                    port_name: p.port_name.clone().unwrap_or_default(),
                    block_type: p.block_type.clone(),
                    source_port_id: p.source_port_id.clone(),
                    interconnection,
                })
            })
            .collect())
    }

    fn mappings_by_port(
        &self,
        symbol: &str,
        port_id: &str,
    ) -> Result<Vec<FunctionMapping>, SourceError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.source_symbol == symbol && m.source_port_id == port_id)
            .cloned()
            .collect())
    }

    fn mappings_by_variant(&self, variant: &str) -> Result<Vec<FunctionMapping>, SourceError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.variant.as_deref() == Some(variant))
            .cloned()
            .collect())
    }

    fn generated_ports(
        &self,
        block: &str,
        port_fragment: &str,
    ) -> Result<Vec<String>, SourceError> {
        Ok(self
            .generated_ports
            .iter()
            .filter(|(b, port)| b == block && port.contains(port_fragment))
            .map(|(_, port)| port.clone())
            .collect())
    }

    fn block_count(&self, diagram: &str) -> Result<usize, SourceError> {
        Ok(self.blocks.iter().filter(|(d, _)| d == diagram).count())
    }

    fn block_variants(&self, diagram: &str) -> Result<Vec<BlockVariant>, SourceError> {
        Ok(self
            .parameters
            .iter()
            .filter(|p| p.diagram_name == diagram)
            .filter_map(|p| {
                Some(BlockVariant {
                    block: p.block.clone(),
                    variant: p.variant.clone()?,
                })
            })
            .collect())
    }
}

/// Diagram documents parsed from XML strings up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryDiagrams {
    documents: AHashMap<String, Rc<DiagramTree>>,
}

impl MemoryDiagrams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagram(mut self, name: &str, xml: &str) -> Result<Self, SourceError> {
        let tree = DiagramTree::parse(xml).map_err(|source| SourceError::Document {
            diagram: name.to_string(),
            source,
        })?;
        self.documents.insert(name.to_string(), Rc::new(tree));
        Ok(self)
    }
}

impl DiagramSource for MemoryDiagrams {
    fn diagram(&self, name: &str) -> Result<Rc<DiagramTree>, SourceError> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::DiagramNotFound(name.to_string()))
    }

    fn diagram_names(&self) -> Result<Vec<String>, SourceError> {
        let mut names: Vec<String> = self.documents.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
