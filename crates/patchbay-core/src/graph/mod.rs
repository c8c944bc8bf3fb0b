//! Signal-graph engine: model, compiler, evaluators, render plane, handoff.
//!
//! The module family follows a strict two-plane split:
//!
//! - [`GraphModel`](model::GraphModel) - owned by the control plane. Holds
//!   topology (nodes, per-port edges), performs mutations, refuses cycles
//!   and arity violations at mutation time. NOT touched by the audio thread.
//! - [`RenderPlan`](plan::RenderPlan) - immutable evaluation schedule
//!   produced by [`compile()`](plan::compile): one record per node in
//!   topological order, with every input resolved to either a literal or an
//!   earlier slot, plus pre-allocated per-node state and a scratch buffer.
//!   The audio thread never sees partial state.
//!
//! # Handoff
//!
//! Plans move between the planes through [`engine_link`](link::engine_link):
//! a pair of SPSC rings. Publishing is one wait-free push; the render plane
//! adopts the newest plan at its next callback boundary, migrates oscillator
//! phase for node ids that survived the edit, and returns the retired plan
//! whole so its memory is freed on the control plane. A failed compilation
//! publishes nothing and the previous plan keeps running.
//!
//! # Real-time contract
//!
//! Inside the audio callback the engine performs no allocation, no locking,
//! no logging, and no graph validation; everything with an unbounded worst
//! case happened on the control plane before publish.

pub mod edge;
pub mod eval;
pub mod model;
pub mod node;
pub mod plan;

#[cfg(feature = "std")]
pub mod engine;
#[cfg(feature = "std")]
pub mod link;

pub use edge::EdgeId;
pub use eval::{EvalOp, NodeState};
pub use model::{GraphError, GraphModel};
pub use node::{NodeId, NodeKind};
pub use plan::{CompileError, InputSource, MAX_NODE_INPUTS, PlanStep, RenderPlan, compile};

#[cfg(feature = "std")]
pub use engine::{EngineCommand, RenderEngine};
#[cfg(feature = "std")]
pub use link::{EngineController, PublishError, engine_link};
