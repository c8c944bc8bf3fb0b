//! Control-plane endpoint of the plan handoff.
//!
//! [`engine_link()`] builds a connected [`EngineController`] /
//! [`RenderEngine`](super::engine::RenderEngine) pair. The controller
//! compiles [`GraphModel`](super::model::GraphModel) snapshots into plans,
//! publishes them over the command ring, and reclaims displaced plans from
//! the retirement ring so their memory is freed off the audio thread.

use rtrb::RingBuffer;

use super::engine::{EngineCommand, RenderEngine};
use super::model::GraphModel;
use super::node::NodeId;
use super::plan::{self, CompileError, RenderPlan};

/// Ring capacity for both directions. Sized for far more pending edits than
/// a control surface produces between audio callbacks.
const LINK_CAPACITY: usize = 64;

/// Errors raised by [`EngineController::publish`].
///
/// Either way the engine keeps rendering its current plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// The snapshot failed to compile; nothing was sent.
    Compile(CompileError),
    /// The command ring is full. Retry after the engine renders a buffer.
    ChannelFull,
}

impl core::fmt::Display for PublishError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Compile(e) => write!(f, "plan compilation failed: {e}"),
            Self::ChannelFull => write!(f, "engine command ring is full"),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compile(e) => Some(e),
            Self::ChannelFull => None,
        }
    }
}

impl From<CompileError> for PublishError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

/// Compiles and publishes plans to a paired [`RenderEngine`].
///
/// Lives on the control thread. Holds the node order of the last published
/// plan so the compiler can mark which nodes carry state into the next one.
pub struct EngineController {
    commands: rtrb::Producer<EngineCommand>,
    retired: rtrb::Consumer<Box<RenderPlan>>,
    prev_order: Vec<NodeId>,
    epoch: u64,
}

impl EngineController {
    /// Compiles `model` and sends the resulting plan to the engine.
    ///
    /// Returns the new plan's epoch. On [`PublishError::ChannelFull`] the
    /// compiled plan is discarded locally and the last published order is
    /// kept, so a retry compiles against the plan the engine still runs.
    pub fn publish(&mut self, model: &GraphModel) -> Result<u64, PublishError> {
        self.reclaim();

        let epoch = self.epoch + 1;
        let plan = plan::compile(model, &self.prev_order, epoch)?;
        let order: Vec<NodeId> = plan.node_order().collect();

        if self.commands.push(EngineCommand::Swap(Box::new(plan))).is_err() {
            return Err(PublishError::ChannelFull);
        }

        self.prev_order = order;
        self.epoch = epoch;
        #[cfg(feature = "tracing")]
        tracing::debug!(epoch, steps = self.prev_order.len(), "plan_publish");
        Ok(epoch)
    }

    /// Tells the engine to drop its plan and rewind its sample clock.
    ///
    /// The empty replacement plan is allocated here, on the control thread.
    /// Clears the carried node order: nothing survives a reset.
    pub fn reset(&mut self) -> Result<(), PublishError> {
        self.reclaim();
        let plan = Box::new(RenderPlan::empty(self.epoch));
        if self.commands.push(EngineCommand::Reset(plan)).is_err() {
            return Err(PublishError::ChannelFull);
        }
        self.prev_order.clear();
        #[cfg(feature = "tracing")]
        tracing::debug!("engine_reset");
        Ok(())
    }

    /// Sets the engine's output scaling factor, clamped to `[0, 1]`.
    pub fn set_master_gain(&mut self, gain: f32) -> Result<(), PublishError> {
        self.reclaim();
        let clamped = gain.clamp(0.0, 1.0);
        if self
            .commands
            .push(EngineCommand::SetMasterGain(clamped))
            .is_err()
        {
            return Err(PublishError::ChannelFull);
        }
        Ok(())
    }

    /// Drains and drops every plan the engine has retired. Returns how many
    /// were reclaimed.
    pub fn collect_retired(&mut self) -> usize {
        self.reclaim()
    }

    /// Epoch of the most recently published plan, 0 before the first.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn reclaim(&mut self) -> usize {
        let mut freed = 0;
        while self.retired.pop().is_ok() {
            freed += 1;
        }
        freed
    }
}

/// Creates a connected controller/engine pair for the given sample rate.
///
/// The engine starts with an empty plan (silence) and the default master
/// gain. Move the [`RenderEngine`] to the audio thread; keep the
/// [`EngineController`] wherever edits happen.
pub fn engine_link(sample_rate: f32) -> (EngineController, RenderEngine) {
    let (command_tx, command_rx) = RingBuffer::new(LINK_CAPACITY);
    let (retired_tx, retired_rx) = RingBuffer::new(LINK_CAPACITY);

    let controller = EngineController {
        commands: command_tx,
        retired: retired_rx,
        prev_order: Vec::new(),
        epoch: 0,
    };
    let engine = RenderEngine::new(sample_rate, command_rx, retired_tx);
    (controller, engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeKind;

    #[test]
    fn publish_increments_epoch() {
        let (mut controller, _engine) = engine_link(48_000.0);
        let model = GraphModel::new();
        assert_eq!(controller.epoch(), 0);
        assert_eq!(controller.publish(&model), Ok(1));
        assert_eq!(controller.publish(&model), Ok(2));
    }

    #[test]
    fn published_plan_reaches_engine() {
        let (mut controller, mut engine) = engine_link(48_000.0);
        let mut model = GraphModel::new();
        let c = model.add_node(NodeKind::Constant(1.0)).unwrap();
        let sink = model.add_node(NodeKind::Sink).unwrap();
        model.connect(c, 0, sink, 0).unwrap();

        controller.publish(&model).unwrap();
        // 1.0 through the sink at the default master gain.
        assert!((engine.next_sample() - crate::DEFAULT_MASTER_GAIN).abs() < 1e-6);
        assert_eq!(engine.active_epoch(), 1);
    }

    #[test]
    fn channel_full_keeps_engine_on_old_plan() {
        let (mut controller, mut engine) = engine_link(48_000.0);
        let model = GraphModel::new();

        for _ in 0..64 {
            controller.publish(&model).unwrap();
        }
        assert_eq!(
            controller.publish(&model),
            Err(PublishError::ChannelFull)
        );
        // Epoch reflects the last accepted publish, not the failed one.
        assert_eq!(controller.epoch(), 64);

        engine.next_sample();
        assert_eq!(engine.active_epoch(), 64);
    }

    #[test]
    fn retired_plans_come_back() {
        let (mut controller, mut engine) = engine_link(48_000.0);
        let model = GraphModel::new();

        controller.publish(&model).unwrap();
        controller.publish(&model).unwrap();
        engine.next_sample();

        // First swap retired the initial empty plan, second one the first.
        assert_eq!(controller.collect_retired(), 2);
        assert_eq!(controller.collect_retired(), 0);
    }

    #[test]
    fn reset_rewinds_the_clock() {
        let (mut controller, mut engine) = engine_link(48_000.0);
        let model = GraphModel::new();
        controller.publish(&model).unwrap();

        for _ in 0..10 {
            engine.next_sample();
        }
        assert!(engine.elapsed_seconds() > 0.0);

        controller.reset().unwrap();
        engine.next_sample();
        assert!((engine.elapsed_seconds() - 1.0 / 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn master_gain_is_clamped() {
        let (mut controller, mut engine) = engine_link(48_000.0);
        controller.set_master_gain(2.5).unwrap();
        engine.next_sample();
        assert_eq!(engine.master_gain(), 1.0);

        controller.set_master_gain(-1.0).unwrap();
        engine.next_sample();
        assert_eq!(engine.master_gain(), 0.0);
    }
}
