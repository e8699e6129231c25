use crate::error::PortReferenceError;

pub const INSTANCE_PORT_SEPARATOR: char = '/';

/// The two halves of a composite `block/port` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstancePort<'a> {
    pub block: &'a str,
    pub port: &'a str,
}

/// Splits `block/port` at the first `/`. Later separators stay in the port.
pub fn split_instance_port(token: &str) -> Result<InstancePort<'_>, PortReferenceError> {
    token
        .split_once(INSTANCE_PORT_SEPARATOR)
        .map(|(block, port)| InstancePort { block, port })
        .ok_or_else(|| PortReferenceError::MissingSeparator(token.to_string()))
}
