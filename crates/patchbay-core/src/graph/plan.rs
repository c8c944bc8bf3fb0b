//! Render plans and the plan compiler.
//!
//! A [`RenderPlan`] is an immutable evaluation schedule produced by
//! [`compile()`]: one [`PlanStep`] per node in topological order, each input
//! resolved to either a literal default or the slot of an earlier step. The
//! plan also carries its own pre-allocated per-node state and scratch
//! buffer, so the render plane can walk it sample by sample without ever
//! allocating.
//!
//! Compilation is Kahn's algorithm with a deterministic tie-break (ascending
//! node id), so identical edit sequences always produce identical plans.

#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BinaryHeap};
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::{BTreeMap, BinaryHeap};

use core::cmp::Reverse;

use super::eval::{self, EvalOp, NodeState};
use super::model::GraphModel;
use super::node::{NodeId, NodeKind};

/// Maximum number of input ports across all node kinds.
///
/// Fixed-size input arrays keep [`PlanStep`] entirely stack-allocated.
pub const MAX_NODE_INPUTS: usize = 2;

/// Where a plan step reads one input from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputSource {
    /// A literal value; unconnected inputs resolve to `Literal(0.0)`.
    Literal(f32),
    /// The output of the step at this earlier plan position.
    Slot(usize),
}

/// One node evaluation record in a compiled plan.
#[derive(Clone, Copy, Debug)]
pub struct PlanStep {
    /// The graph node this step evaluates.
    pub node: NodeId,
    /// Evaluation tag (kind plus baked-in parameter).
    pub op: EvalOp,
    /// Resolved input sources, one per input port.
    pub inputs: [InputSource; MAX_NODE_INPUTS],
    /// This node's slot in the previous plan, if it existed there.
    /// Drives the phase carry-forward at adoption time.
    pub carry_slot: Option<usize>,
}

/// Errors raised by the plan compiler.
///
/// A failed compilation publishes nothing; the previously active plan keeps
/// running. Neither variant can fire while [`GraphModel`] invariants hold;
/// the compiler re-validates defensively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileError {
    /// The topological sort could not consume every node.
    CycleDetected,
    /// A sink node exists in the model but received no plan slot.
    UnreachableSink,
}

impl core::fmt::Display for CompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CycleDetected => write!(f, "graph contains a cycle"),
            Self::UnreachableSink => write!(f, "sink node missing from the compiled order"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompileError {}

/// Immutable, topologically ordered evaluation schedule for one graph
/// version.
///
/// Constructed by the control plane, then moved whole to the render plane.
/// The step list never changes after compilation; `state` and `scratch` are
/// mutated exclusively by whichever plane currently owns the plan, so no
/// memory is ever shared between threads.
#[derive(Debug)]
pub struct RenderPlan {
    steps: Vec<PlanStep>,
    sink_slot: Option<usize>,
    epoch: u64,
    state: Vec<NodeState>,
    scratch: Vec<f32>,
}

impl RenderPlan {
    /// Creates a plan with no steps; rendering it yields silence.
    pub fn empty(epoch: u64) -> Self {
        Self {
            steps: Vec::new(),
            sink_slot: None,
            epoch,
            state: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Returns the number of evaluation steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the compilation epoch (monotonic per controller).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the plan position of the sink, if the graph has one.
    pub fn sink_slot(&self) -> Option<usize> {
        self.sink_slot
    }

    /// Returns the evaluation records in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Iterates node ids in plan (topological) order.
    pub fn node_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.steps.iter().map(|s| s.node)
    }

    /// Returns the accumulated phase of a node's oscillator state.
    pub fn phase_of(&self, node: NodeId) -> Option<f32> {
        self.steps
            .iter()
            .position(|s| s.node == node)
            .map(|i| self.state[i].phase)
    }

    /// Copies runtime state from the retired plan for every step whose node
    /// survived the edit.
    ///
    /// Called by the render plane at adoption, the one instant it owns both
    /// plans; new nodes keep their zero-initialized state.
    pub(crate) fn adopt_state_from(&mut self, prev: &RenderPlan) {
        for (i, step) in self.steps.iter().enumerate() {
            if let Some(slot) = step.carry_slot
                && slot < prev.state.len()
            {
                self.state[i] = prev.state[slot];
            }
        }
    }

    /// Evaluates every step for one sample and returns the sink value
    /// (0.0 if the graph has no sink), before master gain.
    ///
    /// `dt` is the sample period in seconds. Allocation-free: every step
    /// writes its output into the pre-sized scratch buffer at its own slot,
    /// and downstream steps read already-computed upstream slots.
    pub fn run_sample(&mut self, dt: f32) -> f32 {
        for i in 0..self.steps.len() {
            let step = &self.steps[i];
            let a = Self::resolve(step.inputs[0], &self.scratch);
            let b = Self::resolve(step.inputs[1], &self.scratch);
            self.scratch[i] = eval::eval(step.op, a, b, &mut self.state[i], dt);
        }
        self.sink_slot.map_or(0.0, |slot| self.scratch[slot])
    }

    #[inline]
    fn resolve(source: InputSource, scratch: &[f32]) -> f32 {
        match source {
            InputSource::Literal(v) => v,
            // Topological order guarantees the slot was written this sample.
            InputSource::Slot(p) => scratch[p],
        }
    }
}

/// Compiles a graph snapshot into a [`RenderPlan`].
///
/// Kahn's topological sort over the model's nodes, tie-broken by ascending
/// node id so compilation is deterministic and reproducible for identical
/// edit sequences. Every node is compiled, including nodes with no path to
/// the sink; those are evaluated (side-effect-free) but excluded from the
/// output mix, preserving their state and the user's edit intent.
///
/// `prev_order` is the node order of the previously published plan; nodes
/// found there get a [`carry_slot`](PlanStep::carry_slot) so their phase
/// survives the swap. Pass `&[]` for a first compilation.
///
/// # Errors
///
/// [`CompileError::CycleDetected`] if the sort leaves residual nodes, and
/// [`CompileError::UnreachableSink`] if a sink exists but got no slot. Both
/// are defensive re-validation: `GraphModel` refuses cycles at connect time.
pub fn compile(
    model: &GraphModel,
    prev_order: &[NodeId],
    epoch: u64,
) -> Result<RenderPlan, CompileError> {
    let slot_count = model.nodes.len();
    let mut in_degree = Vec::new();
    in_degree.resize(slot_count, 0u32);
    let mut active_count = 0usize;

    for node in model.nodes.iter().flatten() {
        active_count += 1;
        for edge_id in &node.incoming {
            if model.edges[edge_id.0 as usize].is_some() {
                in_degree[node.id.0 as usize] += 1;
            }
        }
    }

    // Min-heap on node id keeps the ready set deterministic.
    let mut ready: BinaryHeap<Reverse<u32>> = model
        .nodes
        .iter()
        .flatten()
        .filter(|n| in_degree[n.id.0 as usize] == 0)
        .map(|n| Reverse(n.id.0))
        .collect();

    let mut order: Vec<(NodeId, NodeKind)> = Vec::with_capacity(active_count);
    while let Some(Reverse(idx)) = ready.pop() {
        if let Some(Some(node)) = model.nodes.get(idx as usize) {
            order.push((node.id, node.kind));
            for edge_id in &node.outgoing {
                if let Some(edge) = &model.edges[edge_id.0 as usize] {
                    let to_idx = edge.to.0 as usize;
                    in_degree[to_idx] -= 1;
                    if in_degree[to_idx] == 0 {
                        ready.push(Reverse(edge.to.0));
                    }
                }
            }
        }
    }

    if order.len() != active_count {
        return Err(CompileError::CycleDetected);
    }

    // Plan position per node id, for input resolution.
    let position: BTreeMap<u32, usize> = order
        .iter()
        .enumerate()
        .map(|(pos, (id, _))| (id.0, pos))
        .collect();
    let carried: BTreeMap<u32, usize> = prev_order
        .iter()
        .enumerate()
        .map(|(slot, id)| (id.0, slot))
        .collect();

    let mut steps = Vec::with_capacity(order.len());
    for &(id, kind) in &order {
        let mut inputs = [InputSource::Literal(0.0); MAX_NODE_INPUTS];
        for (port, input) in inputs.iter_mut().enumerate().take(kind.input_arity() as usize) {
            if let Some((src, _src_port)) = model.source_of(id, port as u16) {
                *input = InputSource::Slot(position[&src.0]);
            }
        }
        steps.push(PlanStep {
            node: id,
            op: EvalOp::from(kind),
            inputs,
            carry_slot: carried.get(&id.0).copied(),
        });
    }

    let sink_slot = match model.sink() {
        Some(sink) => Some(
            *position
                .get(&sink.0)
                .ok_or(CompileError::UnreachableSink)?,
        ),
        None => None,
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        epoch,
        steps = steps.len(),
        sink = ?sink_slot,
        "plan_compile"
    );

    let mut state = Vec::new();
    state.resize(steps.len(), NodeState::default());
    let mut scratch = Vec::new();
    scratch.resize(steps.len(), 0.0f32);

    Ok(RenderPlan {
        steps,
        sink_slot,
        epoch,
        state,
        scratch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge::Edge;
    use crate::graph::edge::EdgeId;
    use crate::graph::node::NodeKind;

    fn sine_patch() -> GraphModel {
        let mut g = GraphModel::new();
        let freq = g.add_node(NodeKind::Constant(440.0)).unwrap();
        let osc = g.add_node(NodeKind::Sine).unwrap();
        let sink = g.add_node(NodeKind::Sink).unwrap();
        g.connect(freq, 0, osc, 0).unwrap();
        g.connect(osc, 0, sink, 0).unwrap();
        g
    }

    #[test]
    fn plan_orders_dependencies_first() {
        let g = sine_patch();
        let plan = compile(&g, &[], 1).unwrap();
        assert_eq!(plan.step_count(), 3);

        // Every slot reference points at an earlier step.
        for (i, step) in plan.steps().iter().enumerate() {
            for input in step.inputs {
                if let InputSource::Slot(p) = input {
                    assert!(p < i, "step {i} reads slot {p}");
                }
            }
        }
    }

    #[test]
    fn sink_slot_is_last_consumer() {
        let g = sine_patch();
        let plan = compile(&g, &[], 1).unwrap();
        let sink_slot = plan.sink_slot().unwrap();
        assert!(matches!(plan.steps()[sink_slot].op, EvalOp::Sink));
    }

    #[test]
    fn compile_is_deterministic() {
        let g = sine_patch();
        let a = compile(&g, &[], 1).unwrap();
        let b = compile(&g, &[], 2).unwrap();
        let order_a: Vec<_> = a.node_order().collect();
        let order_b: Vec<_> = b.node_order().collect();
        assert_eq!(order_a, order_b);
    }

    #[test]
    fn unconnected_inputs_default_to_zero() {
        let mut g = GraphModel::new();
        g.add_node(NodeKind::Add).unwrap();
        let plan = compile(&g, &[], 1).unwrap();
        assert_eq!(plan.steps()[0].inputs[0], InputSource::Literal(0.0));
        assert_eq!(plan.steps()[0].inputs[1], InputSource::Literal(0.0));
    }

    #[test]
    fn unreachable_nodes_are_compiled_but_not_mixed() {
        let mut g = sine_patch();
        let orphan = g.add_node(NodeKind::Constant(7.0)).unwrap();
        let mut plan = compile(&g, &[], 1).unwrap();

        assert_eq!(plan.step_count(), 4);
        assert!(plan.node_order().any(|n| n == orphan));

        // Output is the sine at phase 0, not the orphan constant.
        assert_eq!(plan.run_sample(1.0 / 48_000.0), 0.5);
    }

    #[test]
    fn empty_model_compiles_to_silence() {
        let g = GraphModel::new();
        let mut plan = compile(&g, &[], 1).unwrap();
        assert_eq!(plan.step_count(), 0);
        assert_eq!(plan.run_sample(1.0 / 48_000.0), 0.0);
    }

    #[test]
    fn no_sink_means_zero_output() {
        let mut g = GraphModel::new();
        g.add_node(NodeKind::Constant(3.0)).unwrap();
        let mut plan = compile(&g, &[], 1).unwrap();
        assert_eq!(plan.sink_slot(), None);
        assert_eq!(plan.run_sample(1.0 / 48_000.0), 0.0);
    }

    #[test]
    fn carry_slots_map_ids_across_plans() {
        let g = sine_patch();
        let first = compile(&g, &[], 1).unwrap();
        let prev_order: Vec<_> = first.node_order().collect();

        let mut g2 = sine_patch();
        // Fresh model restarts id assignment, so ids 0..=2 match prev_order
        // and every step carries.
        let plan = compile(&g2, &prev_order, 2).unwrap();
        assert!(plan.steps().iter().all(|s| s.carry_slot.is_some()));

        let extra = g2.add_node(NodeKind::Triangle).unwrap();
        let plan = compile(&g2, &prev_order, 3).unwrap();
        let extra_step = plan.steps().iter().find(|s| s.node == extra).unwrap();
        assert_eq!(extra_step.carry_slot, None);
    }

    #[test]
    fn adopt_state_copies_carried_phase() {
        let g = sine_patch();
        let mut first = compile(&g, &[], 1).unwrap();
        for _ in 0..100 {
            first.run_sample(1.0 / 48_000.0);
        }
        let osc = g.nodes().find(|(_, k)| *k == NodeKind::Sine).unwrap().0;
        let phase_before = first.phase_of(osc).unwrap();
        assert!(phase_before > 0.0);

        let prev_order: Vec<_> = first.node_order().collect();
        let mut second = compile(&g, &prev_order, 2).unwrap();
        second.adopt_state_from(&first);
        assert_eq!(second.phase_of(osc).unwrap(), phase_before);
    }

    #[test]
    fn defensive_cycle_check_fires_on_forced_cycle() {
        // The public API refuses cycles, so force one through the internals
        // to exercise the compiler's residual-graph check.
        let mut g = GraphModel::new();
        let a = g.add_node(NodeKind::Add).unwrap();
        let b = g.add_node(NodeKind::Add).unwrap();
        g.connect(a, 0, b, 0).unwrap();

        let forced = Edge {
            from: b,
            from_port: 0,
            to: a,
            to_port: 0,
        };
        g.edges.push(Some(forced));
        let eid = EdgeId((g.edges.len() - 1) as u32);
        g.nodes[b.index() as usize]
            .as_mut()
            .unwrap()
            .outgoing
            .push(eid);
        g.nodes[a.index() as usize]
            .as_mut()
            .unwrap()
            .incoming
            .push(eid);

        let err = compile(&g, &[], 1).unwrap_err();
        assert_eq!(err, CompileError::CycleDetected);
    }
}
