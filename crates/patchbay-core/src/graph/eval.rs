//! Per-sample node evaluators.
//!
//! Pure math: each evaluator maps resolved input values (and, for
//! oscillators, accumulated phase) to one output sample. Oscillators are
//! phase-accumulator based so that frequency edits and plan swaps never
//! discontinue the waveform; at constant frequency `f` the accumulated phase
//! equals `frac(f * t)` and the outputs match the closed forms exactly.
//!
//! All oscillator outputs are unipolar, normalized to `[0, 1]`.

use core::f32::consts::TAU;

use libm::{floorf, sinf};

use super::node::NodeKind;

/// Evaluation tag for one plan step: a [`NodeKind`](super::node::NodeKind)
/// with its parameter baked in, dispatched per sample by a single `match`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EvalOp {
    /// Sine oscillator.
    Sine,
    /// Triangle oscillator.
    Triangle,
    /// Sawtooth oscillator.
    Sawtooth,
    /// Square oscillator.
    Square,
    /// Fixed literal value.
    Constant(f32),
    /// `in0 + in1`.
    Add,
    /// `in0 * in1`.
    Multiply,
    /// `in0 / in1`, zero when `in1 == 0`.
    Divide,
    /// Passes its single input through to the output mix.
    Sink,
}

impl From<NodeKind> for EvalOp {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Sine => EvalOp::Sine,
            NodeKind::Triangle => EvalOp::Triangle,
            NodeKind::Sawtooth => EvalOp::Sawtooth,
            NodeKind::Square => EvalOp::Square,
            NodeKind::Constant(v) => EvalOp::Constant(v),
            NodeKind::Add => EvalOp::Add,
            NodeKind::Multiply => EvalOp::Multiply,
            NodeKind::Divide => EvalOp::Divide,
            NodeKind::Sink => EvalOp::Sink,
        }
    }
}

/// Persistent per-node runtime state.
///
/// Created zeroed when a node first appears in a compiled plan, carried
/// forward by id-matching into the next plan while the node exists, and
/// discarded with the plan once the node is removed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeState {
    /// Oscillator phase position in `[0, 1)`.
    pub phase: f32,
}

/// Fractional part, wrapping into `[0, 1)` for negative inputs too.
#[inline]
fn frac(x: f32) -> f32 {
    x - floorf(x)
}

/// Evaluates one node for one sample.
///
/// `a` and `b` are the resolved input values (unconnected inputs arrive as
/// 0.0; for oscillators `a` is the frequency in Hz and `b` is unused).
/// `dt` is the sample period in seconds. Phase advances after the output is
/// taken, so the first sample after a reset sits at phase 0.
#[inline]
pub(crate) fn eval(op: EvalOp, a: f32, b: f32, state: &mut NodeState, dt: f32) -> f32 {
    match op {
        EvalOp::Sine => {
            let out = (sinf(TAU * state.phase) + 1.0) / 2.0;
            state.phase = frac(state.phase + a * dt);
            out
        }
        EvalOp::Triangle => {
            let p = state.phase;
            let ramp = if p < 0.5 { 4.0 * p - 1.0 } else { 3.0 - 4.0 * p };
            state.phase = frac(p + a * dt);
            (ramp + 1.0) / 2.0
        }
        EvalOp::Sawtooth => {
            // (2p - 1 + 1) / 2 collapses to the phase ramp itself.
            let out = state.phase;
            state.phase = frac(out + a * dt);
            out
        }
        EvalOp::Square => {
            let out = if state.phase < 0.5 { 1.0 } else { 0.0 };
            state.phase = frac(state.phase + a * dt);
            out
        }
        EvalOp::Constant(v) => v,
        EvalOp::Add => a + b,
        EvalOp::Multiply => a * b,
        EvalOp::Divide => {
            // Defined fallback, not a fault: a zero divisor yields silence
            // rather than an infinity reaching the output mix.
            if b == 0.0 { 0.0 } else { a / b }
        }
        EvalOp::Sink => a,
    }
}
