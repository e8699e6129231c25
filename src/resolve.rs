use crate::data::PortReference;
use crate::error::{PortReferenceError, SourceError};
use crate::parsing::split_instance_port;
use crate::source::RelationalSource;
use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Malformed(#[from] PortReferenceError),

    #[error("Port '{reference}' has {} conflicting block types", .candidates.len())]
    AmbiguousBlockType {
        reference: String,
        candidates: Vec<String>,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Turns composite `block/port` tokens into `PortReference`s with the declared
/// type of the owning block, looked up in the parameter table.
pub struct PortResolver<'a> {
    source: &'a dyn RelationalSource,
}

impl<'a> PortResolver<'a> {
    pub fn new(source: &'a dyn RelationalSource) -> Self {
        Self { source }
    }

    /// Rows without a block type are ignored; identical types collapse.
    /// No typed row leaves `block_type` as `None`.
    pub fn resolve(
        &self,
        diagram: &str,
        instance_port: &str,
    ) -> Result<PortReference, ResolveError> {
        let split = split_instance_port(instance_port)?;
        let block_types: Vec<String> = self
            .source
            .parameter_block_types(diagram, split.block, split.port)?
            .into_iter()
            .flatten()
            .unique()
            .collect();

        let block_type = match block_types.len() {
            0 => None,
            1 => block_types.into_iter().next(),
            _ => {
                return Err(ResolveError::AmbiguousBlockType {
                    reference: instance_port.to_string(),
                    candidates: block_types,
                });
            }
        };

        Ok(PortReference {
            diagram_name: diagram.to_string(),
            block_name: split.block.to_string(),
            port_name: split.port.to_string(),
            block_type,
        })
    }
}
