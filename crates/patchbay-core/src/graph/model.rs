//! Graph model - the control plane's mutable node/edge tables.
//!
//! [`GraphModel`] owns the editing-session topology. It validates every
//! mutation up front (port arity, node existence, cycle refusal, at most one
//! source per input port, at most one sink) so that the plan compiler only
//! ever sees a structurally valid graph. No evaluation happens here, and the
//! audio thread never touches this type.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::edge::{Edge, EdgeId};
use super::node::{NodeData, NodeId, NodeKind};

/// Errors raised synchronously by graph mutators.
///
/// A failed mutation leaves the graph unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The referenced node does not exist in the graph.
    UnknownNode(NodeId),
    /// A port index exceeds the node kind's arity.
    PortOutOfRange {
        /// Node whose port range was violated.
        node: NodeId,
        /// Offending port index.
        port: u16,
        /// The node kind's arity on the violated side.
        arity: u16,
    },
    /// Inserting this edge would create a path from a node back to itself.
    WouldCreateCycle,
    /// No edge matches the `(src, src_port, dst, dst_port)` quad.
    UnknownConnection,
    /// A constant-only operation was applied to a node of another kind.
    NotAConstant(NodeId),
    /// The graph already contains a sink node.
    DuplicateSink,
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "node {id} not found"),
            Self::PortOutOfRange { node, port, arity } => {
                write!(f, "port {port} out of range for {node} (arity {arity})")
            }
            Self::WouldCreateCycle => write!(f, "adding this connection would create a cycle"),
            Self::UnknownConnection => write!(f, "no such connection"),
            Self::NotAConstant(id) => write!(f, "node {id} is not a constant"),
            Self::DuplicateSink => write!(f, "graph already has a sink node"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Directed acyclic graph of signal nodes, owned by the control plane.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new)
/// 2. Add nodes: [`add_node()`](Self::add_node)
/// 3. Connect ports: [`connect()`](Self::connect)
/// 4. Compile a snapshot: [`compile()`](super::plan::compile)
///
/// Mutations happen on the control thread; compilation produces an immutable
/// [`RenderPlan`](super::plan::RenderPlan) for the render thread.
#[derive(Debug, Default)]
pub struct GraphModel {
    pub(crate) nodes: Vec<Option<NodeData>>,
    pub(crate) edges: Vec<Option<Edge>>,
    next_node_slot: u32,
    next_edge_slot: u32,
}

impl GraphModel {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Node mutations ---

    /// Adds a node of the given kind. Returns the new node's ID.
    ///
    /// Fails with [`GraphError::DuplicateSink`] if `kind` is
    /// [`NodeKind::Sink`] and the graph already has one; a graph drives at
    /// most one audible output.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, GraphError> {
        if matches!(kind, NodeKind::Sink) && self.sink().is_some() {
            return Err(GraphError::DuplicateSink);
        }

        let id = NodeId(self.next_node_slot);
        self.next_node_slot += 1;

        let idx = id.0 as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize_with(idx + 1, || None);
        }
        self.nodes[idx] = Some(NodeData::new(id, kind));

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} node {id}", kind.name());
        Ok(id)
    }

    /// Removes a node and cascades removal of every edge referencing it.
    ///
    /// Returns an error if the node doesn't exist.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let idx = id.0 as usize;
        let node = self
            .nodes
            .get(idx)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::UnknownNode(id))?;

        // Collect edge IDs to remove (avoid borrow conflict).
        let edge_ids: Vec<EdgeId> = node
            .incoming
            .iter()
            .chain(node.outgoing.iter())
            .copied()
            .collect();

        for edge_id in edge_ids {
            self.disconnect_internal(edge_id);
        }

        self.nodes[idx] = None;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    /// Replaces the literal value of a [`NodeKind::Constant`] node.
    ///
    /// Fails with [`GraphError::UnknownNode`] if the node doesn't exist and
    /// [`GraphError::NotAConstant`] if it is of another kind.
    pub fn set_constant_value(&mut self, id: NodeId, value: f32) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(GraphError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Constant(v) => {
                *v = value;
                Ok(())
            }
            _ => Err(GraphError::NotAConstant(id)),
        }
    }

    /// Connects a source output port to a destination input port.
    ///
    /// Returns the new edge's ID, or an error if:
    /// - Either node doesn't exist
    /// - Either port index exceeds the node kind's arity
    /// - The edge would create a cycle (including a self-loop)
    ///
    /// An input port holds at most one source: connecting over an occupied
    /// `(dst, dst_port)` silently replaces the prior connection.
    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: u16,
        dst: NodeId,
        dst_port: u16,
    ) -> Result<EdgeId, GraphError> {
        let src_arity = self.get_node(src)?.kind.output_arity();
        let dst_arity = self.get_node(dst)?.kind.input_arity();

        if src_port >= src_arity {
            return Err(GraphError::PortOutOfRange {
                node: src,
                port: src_port,
                arity: src_arity,
            });
        }
        if dst_port >= dst_arity {
            return Err(GraphError::PortOutOfRange {
                node: dst,
                port: dst_port,
                arity: dst_arity,
            });
        }

        // Cycle refusal: the edge src -> dst closes a loop iff dst already
        // reaches src. Covers self-loops (a node reaches itself trivially).
        if self.can_reach(dst, src) {
            return Err(GraphError::WouldCreateCycle);
        }

        // One source per input port: displace any prior occupant.
        if let Some(prior) = self.edge_into(dst, dst_port) {
            self.disconnect_internal(prior);
        }

        let edge_id = EdgeId(self.next_edge_slot);
        self.next_edge_slot += 1;

        let edge = Edge {
            from: src,
            from_port: src_port,
            to: dst,
            to_port: dst_port,
        };

        let edge_idx = edge_id.0 as usize;
        if edge_idx >= self.edges.len() {
            self.edges.resize_with(edge_idx + 1, || None);
        }
        self.edges[edge_idx] = Some(edge);

        // Update adjacency lists. Both nodes were validated above.
        if let Some(Some(node)) = self.nodes.get_mut(src.0 as usize) {
            node.outgoing.push(edge_id);
        }
        if let Some(Some(node)) = self.nodes.get_mut(dst.0 as usize) {
            node.incoming.push(edge_id);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {src}:{src_port} -> {dst}:{dst_port}");
        Ok(edge_id)
    }

    /// Disconnects the edge matching the `(src, src_port, dst, dst_port)`
    /// quad.
    ///
    /// Returns [`GraphError::UnknownConnection`] if no such edge exists.
    pub fn disconnect(
        &mut self,
        src: NodeId,
        src_port: u16,
        dst: NodeId,
        dst_port: u16,
    ) -> Result<(), GraphError> {
        let id = self
            .find_edge(src, src_port, dst, dst_port)
            .ok_or(GraphError::UnknownConnection)?;
        self.disconnect_internal(id);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {src}:{src_port} -> {dst}:{dst_port}");
        Ok(())
    }

    /// Removes every node and edge.
    ///
    /// ID counters keep advancing: ids are never reused within the session,
    /// so a node added after `reset()` can't alias state carried in a stale
    /// render plan.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_reset");
    }

    // --- Queries ---

    /// Returns the number of active nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns the number of active edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Returns the kind of a node, if it exists.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .map(|n| n.kind)
    }

    /// Returns `true` if the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.kind(id).is_some()
    }

    /// Iterates active nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, NodeKind)> + '_ {
        self.nodes.iter().flatten().map(|n| (n.id, n.kind))
    }

    /// Iterates active edges as `(src, src_port, dst, dst_port)` quads.
    pub fn connections(&self) -> impl Iterator<Item = (NodeId, u16, NodeId, u16)> + '_ {
        self.edges
            .iter()
            .flatten()
            .map(|e| (e.from, e.from_port, e.to, e.to_port))
    }

    /// Returns the source feeding `(dst, port)`, if that input is connected.
    pub fn source_of(&self, dst: NodeId, port: u16) -> Option<(NodeId, u16)> {
        let edge_id = self.edge_into(dst, port)?;
        self.edges[edge_id.0 as usize]
            .as_ref()
            .map(|e| (e.from, e.from_port))
    }

    /// Returns the sink node, if the graph has one.
    pub fn sink(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .flatten()
            .find(|n| matches!(n.kind, NodeKind::Sink))
            .map(|n| n.id)
    }

    // --- Internal helpers ---

    fn get_node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::UnknownNode(id))
    }

    /// DFS reachability check: can `from` reach `to` via existing edges?
    ///
    /// Trivially true for `from == to`.
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = Vec::new();
        visited.resize(self.nodes.len(), false);
        let mut stack = Vec::with_capacity(8);
        stack.push(from);

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(node)) = self.nodes.get(idx) {
                for edge_id in &node.outgoing {
                    if let Some(edge) = &self.edges[edge_id.0 as usize] {
                        stack.push(edge.to);
                    }
                }
            }
        }
        false
    }

    /// Finds the edge occupying input port `(dst, port)`, if any.
    fn edge_into(&self, dst: NodeId, port: u16) -> Option<EdgeId> {
        let node = self.nodes.get(dst.0 as usize)?.as_ref()?;
        node.incoming.iter().copied().find(|&eid| {
            self.edges[eid.0 as usize]
                .as_ref()
                .is_some_and(|e| e.to_port == port)
        })
    }

    /// Finds the edge ID matching the full quad, if one exists.
    fn find_edge(&self, src: NodeId, src_port: u16, dst: NodeId, dst_port: u16) -> Option<EdgeId> {
        let node = self.nodes.get(src.0 as usize)?.as_ref()?;
        node.outgoing.iter().copied().find(|&eid| {
            self.edges[eid.0 as usize]
                .as_ref()
                .is_some_and(|e| e.to == dst && e.from_port == src_port && e.to_port == dst_port)
        })
    }

    /// Disconnects an edge without error checking (caller must verify
    /// existence).
    fn disconnect_internal(&mut self, id: EdgeId) {
        let idx = id.0 as usize;
        if let Some(edge) = self.edges[idx].take() {
            if let Some(Some(node)) = self.nodes.get_mut(edge.from.0 as usize) {
                node.outgoing.retain(|e| *e != id);
            }
            if let Some(Some(node)) = self.nodes.get_mut(edge.to.0 as usize) {
                node.incoming.retain(|e| *e != id);
            }
        }
    }
}
