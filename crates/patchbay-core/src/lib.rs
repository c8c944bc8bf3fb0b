//! Patchbay Core - real-time signal-graph engine
//!
//! This crate is the kernel of patchbay, a modular sound synthesizer built
//! around a user-editable directed graph of signal nodes (oscillators,
//! arithmetic combinators, constants, and a terminal sink). It provides:
//!
//! - [`GraphModel`] - the mutable node/edge tables owned by the control
//!   plane, with structural validation (port arity, cycle refusal,
//!   one-source-per-input)
//! - [`compile`] - the plan compiler, turning a graph snapshot into an
//!   immutable, topologically ordered [`RenderPlan`]
//! - [`RenderEngine`] - the render-plane half: walks the active plan once
//!   per sample inside the audio callback, never allocating or blocking
//! - [`EngineController`] / [`engine_link`] - the wait-free handoff channel
//!   publishing new plans from the control plane to the render plane
//!
//! # Two-plane architecture
//!
//! The system uses a two-object split: the control plane owns the
//! [`GraphModel`] and may allocate, block, and log; the render plane owns
//! the active [`RenderPlan`] and does nothing with an unbounded worst case.
//! The only primitive crossing the boundary is a pair of SPSC rings carrying
//! whole plans by ownership, so neither plane ever reads memory the other
//! might be mutating.
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{GraphModel, NodeKind, engine_link};
//!
//! let mut graph = GraphModel::new();
//! let freq = graph.add_node(NodeKind::Constant(440.0)).unwrap();
//! let osc = graph.add_node(NodeKind::Sine).unwrap();
//! let sink = graph.add_node(NodeKind::Sink).unwrap();
//! graph.connect(freq, 0, osc, 0).unwrap();
//! graph.connect(osc, 0, sink, 0).unwrap();
//!
//! let (mut controller, mut engine) = engine_link(48_000.0);
//! controller.publish(&graph).unwrap();
//!
//! // Normally cpal calls this; one stereo buffer by hand:
//! let mut buffer = [0.0f32; 128];
//! engine.render(&mut buffer, 2);
//! assert_eq!(buffer[0], 0.15); // (sin(0) + 1) / 2 * default master gain
//! ```
//!
//! # no_std Support
//!
//! The graph model, compiler, and evaluators are `no_std` compatible with
//! `alloc`. The handoff channel and render engine need the default `std`
//! feature (they sit on `rtrb`). Disable default features for embedded use:
//!
//! ```toml
//! [dependencies]
//! patchbay-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod graph;

pub use graph::eval::{EvalOp, NodeState};
pub use graph::model::{GraphError, GraphModel};
pub use graph::node::{NodeId, NodeKind};
pub use graph::plan::{CompileError, InputSource, MAX_NODE_INPUTS, PlanStep, RenderPlan, compile};

#[cfg(feature = "std")]
pub use graph::engine::{EngineCommand, RenderEngine};
#[cfg(feature = "std")]
pub use graph::link::{EngineController, PublishError, engine_link};

/// Default master gain applied to the sink value before it reaches the
/// output channels.
pub const DEFAULT_MASTER_GAIN: f32 = 0.3;
