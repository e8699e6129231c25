pub mod tree;

pub use tree::*;

/// Element and attribute names of `ic_diagram.xml`.
pub mod tags {
    /// Name-bearing leaf; its `item` attribute carries the qualified instance name.
    pub const NAME: &str = "name";
    pub const NAME_ITEM: &str = "item";
    /// Leaf block node.
    pub const BLOCK: &str = "afi";
    /// Compound node (a block realized as a composed sub-assembly).
    pub const COMPOUND: &str = "cc";
    pub const PORT: &str = "port";
    pub const PORT_IDENTIFIER: &str = "portIdentifier";
    pub const PORT_ID: &str = "portId";
    /// Direct-connection marker under a port.
    pub const CONNECTION: &str = "connection";
    /// Signal definition; a `connector` nested under it marks connector wiring.
    pub const SIGNAL_DEFINITION: &str = "sigdef";
    pub const CONNECTOR: &str = "connector";
}
