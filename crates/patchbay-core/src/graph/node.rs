//! Node identity and kinds for the signal graph.
//!
//! Every node has a [`NodeId`] and a [`NodeKind`] that fixes both its
//! per-sample behavior and its port arity. `NodeData` bundles the kind with
//! the adjacency bookkeeping the model and compiler share.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::edge::EdgeId;

/// Unique identifier for a node in the signal graph.
///
/// Node IDs are assigned sequentially at creation and never reused within a
/// graph instance, even across [`reset()`](super::model::GraphModel::reset).
/// They remain stable across graph mutations and plan compilations, which is
/// what lets oscillator phase survive a plan swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Returns a sentinel value used for uninitialized node references.
    #[inline]
    pub fn sentinel() -> Self {
        Self(u32::MAX)
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The kind of a signal node, a closed enumeration.
///
/// The kind fixes the node's input and output arity and its per-sample
/// evaluation. Oscillators take their frequency (Hz) from input port 0, not
/// from a stored parameter; only [`Constant`](NodeKind::Constant) carries a
/// kind-specific value.
///
/// Oscillator outputs are unipolar, normalized to `[0, 1]`. That is a
/// deliberate control-rate-friendly choice: callers needing bipolar audio
/// rescale downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// Sine oscillator: `(sin(2*pi*phase) + 1) / 2`.
    Sine,
    /// Triangle oscillator, normalized to `[0, 1]`.
    Triangle,
    /// Sawtooth oscillator: the raw phase ramp in `[0, 1)`.
    Sawtooth,
    /// Square oscillator: exactly 1.0 or 0.0.
    Square,
    /// Emits a fixed literal value every sample.
    Constant(f32),
    /// Sum of its two inputs.
    Add,
    /// Product of its two inputs.
    Multiply,
    /// Quotient of its two inputs; a zero divisor yields 0.0.
    Divide,
    /// Terminal sink: its single input becomes the audible output.
    /// At most one per graph.
    Sink,
}

impl NodeKind {
    /// Number of input ports for this kind.
    pub fn input_arity(self) -> u16 {
        match self {
            NodeKind::Sine | NodeKind::Triangle | NodeKind::Sawtooth | NodeKind::Square => 1,
            NodeKind::Constant(_) => 0,
            NodeKind::Add | NodeKind::Multiply | NodeKind::Divide => 2,
            NodeKind::Sink => 1,
        }
    }

    /// Number of output ports for this kind.
    pub fn output_arity(self) -> u16 {
        match self {
            NodeKind::Sink => 0,
            _ => 1,
        }
    }

    /// Stable lowercase name, used for logging and the project format.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Sine => "sine",
            NodeKind::Triangle => "triangle",
            NodeKind::Sawtooth => "sawtooth",
            NodeKind::Square => "square",
            NodeKind::Constant(_) => "constant",
            NodeKind::Add => "add",
            NodeKind::Multiply => "multiply",
            NodeKind::Divide => "divide",
            NodeKind::Sink => "sink",
        }
    }
}

/// Internal bookkeeping for a node in the graph.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Indices of edges arriving at this node.
    pub incoming: Vec<EdgeId>,
    /// Indices of edges leaving this node.
    pub outgoing: Vec<EdgeId>,
}

impl NodeData {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arities_match_kind() {
        assert_eq!(NodeKind::Sine.input_arity(), 1);
        assert_eq!(NodeKind::Constant(1.0).input_arity(), 0);
        assert_eq!(NodeKind::Add.input_arity(), 2);
        assert_eq!(NodeKind::Divide.input_arity(), 2);
        assert_eq!(NodeKind::Sink.input_arity(), 1);
        assert_eq!(NodeKind::Sink.output_arity(), 0);
        assert_eq!(NodeKind::Square.output_arity(), 1);
    }

    #[test]
    fn sentinel_is_not_a_real_id() {
        assert_eq!(NodeId::sentinel().index(), u32::MAX);
        assert_ne!(NodeId(0), NodeId::sentinel());
    }
}
