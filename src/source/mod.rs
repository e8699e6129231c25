//! Read-only access to the generator's database and to the packaged diagrams.
//!
//! The rules only ever see these traits. `sqlite` and `archive` are the
//! production adapters; `memory` backs tests and dry runs.

use crate::data::{BlockVariant, ConnectionRecord, FunctionMapping, LogEntry};
use crate::diagram::DiagramTree;
use crate::error::SourceError;
use std::rc::Rc;

pub mod archive;
pub mod memory;
pub mod sqlite;

pub use archive::DiagramArchive;
pub use memory::{MemoryDiagrams, MemoryRelational};
pub use sqlite::MitoDatabase;

/// Parameterized read intents against the generator's relational bookkeeping.
pub trait RelationalSource {
    /// All `log_summary` rows of one run.
    fn log_entries(&self, run_id: &str) -> Result<Vec<LogEntry>, SourceError>;

    /// `block_type` of every `diagram_parameter` row matching `(diagram, block, i_o_name)`.
    fn parameter_block_types(
        &self,
        diagram: &str,
        block: &str,
        port: &str,
    ) -> Result<Vec<Option<String>>, SourceError>;

    /// `diagram_parameter` rows of a diagram that carry an interconnection.
    fn connection_records(&self, diagram: &str) -> Result<Vec<ConnectionRecord>, SourceError>;

    /// Mapping rows for `(source_target_symbol, source_port_id)`, in source order.
    fn mappings_by_port(
        &self,
        symbol: &str,
        port_id: &str,
    ) -> Result<Vec<FunctionMapping>, SourceError>;

    /// Mapping rows whose variant equals `variant`.
    fn mappings_by_variant(&self, variant: &str) -> Result<Vec<FunctionMapping>, SourceError>;

    /// `temp_generated_artifact.port` values of `block` containing `port_fragment`.
    fn generated_ports(&self, block: &str, port_fragment: &str)
    -> Result<Vec<String>, SourceError>;

    /// Number of `diagram_blocks` rows of a diagram.
    fn block_count(&self, diagram: &str) -> Result<usize, SourceError>;

    /// `(block, variant)` pairs of a diagram's parameters with a variant set.
    fn block_variants(&self, diagram: &str) -> Result<Vec<BlockVariant>, SourceError>;
}

/// Resolves diagram names to parsed documents.
pub trait DiagramSource {
    fn diagram(&self, name: &str) -> Result<Rc<DiagramTree>, SourceError>;

    fn diagram_names(&self) -> Result<Vec<String>, SourceError>;
}
