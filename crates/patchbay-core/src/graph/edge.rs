//! Per-port connections between signal nodes.
//!
//! An `Edge` carries the signal from one node's output port to another
//! node's input port. Ports are zero-indexed per node and bounded by the
//! node kind's arity. Each input port accepts at most one incoming edge;
//! inputs with no edge resolve to 0.0 at compile time.

use super::node::NodeId;

/// Unique identifier for an edge in the signal graph.
///
/// Edge IDs are assigned sequentially and never reused within a graph
/// instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// A directed, port-addressed connection between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Output port on the source node.
    pub from_port: u16,
    /// Destination node.
    pub to: NodeId,
    /// Input port on the destination node.
    pub to_port: u16,
}
