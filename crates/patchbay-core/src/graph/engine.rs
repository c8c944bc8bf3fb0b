//! Render engine - the audio thread's half of the plan handoff.
//!
//! [`RenderEngine`] owns the currently active [`RenderPlan`] and produces
//! samples from it. It receives replacement plans from the control plane
//! over a wait-free SPSC ring and returns displaced plans over a second
//! ring, so the audio thread never allocates, frees, locks, or logs.
//! Use [`engine_link()`](super::link::engine_link) to construct one paired
//! with its controller.

use rtrb::{Consumer, Producer};

use super::plan::RenderPlan;
use crate::DEFAULT_MASTER_GAIN;

/// Control messages consumed by the render engine between samples.
pub enum EngineCommand {
    /// Replace the active plan. Runtime state carries over for surviving
    /// nodes at adoption.
    Swap(Box<RenderPlan>),
    /// Retire the active plan in favor of the pre-built empty plan carried
    /// here, and rewind the sample clock to zero. The controller allocates
    /// the replacement; the render plane only swaps it in.
    Reset(Box<RenderPlan>),
    /// Replace the output scaling factor, pre-clamped to `[0, 1]`.
    SetMasterGain(f32),
}

/// Pulls plans and commands from the control plane and renders samples.
///
/// All methods here uphold the real-time contract: no allocation, no
/// deallocation, no locks, no logging. Displaced plans travel back to the
/// controller, which drops them on its own thread.
pub struct RenderEngine {
    active: Box<RenderPlan>,
    commands: Consumer<EngineCommand>,
    retired: Producer<Box<RenderPlan>>,
    sample_rate: f32,
    dt: f32,
    master_gain: f32,
    samples_elapsed: u64,
}

impl RenderEngine {
    pub(crate) fn new(
        sample_rate: f32,
        commands: Consumer<EngineCommand>,
        retired: Producer<Box<RenderPlan>>,
    ) -> Self {
        Self {
            active: Box::new(RenderPlan::empty(0)),
            commands,
            retired,
            sample_rate,
            dt: 1.0 / sample_rate,
            master_gain: DEFAULT_MASTER_GAIN,
            samples_elapsed: 0,
        }
    }

    /// Applies every pending command, in order.
    ///
    /// Swap is the one moment this thread owns both the old and the new
    /// plan, so the state carry-forward happens here, race-free.
    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                EngineCommand::Swap(mut plan) => {
                    plan.adopt_state_from(&self.active);
                    let old = core::mem::replace(&mut self.active, plan);
                    // Each command retires at most one plan and the rings
                    // share a capacity, so this push cannot fail while the
                    // controller keeps draining retirees.
                    let _ = self.retired.push(old);
                }
                EngineCommand::Reset(plan) => {
                    let old = core::mem::replace(&mut self.active, plan);
                    let _ = self.retired.push(old);
                    self.samples_elapsed = 0;
                }
                EngineCommand::SetMasterGain(gain) => {
                    self.master_gain = gain.clamp(0.0, 1.0);
                }
            }
        }
    }

    /// Produces the next output sample, master gain applied.
    ///
    /// Pending commands are drained first, so a published plan takes effect
    /// on the very next sample.
    pub fn next_sample(&mut self) -> f32 {
        self.drain_commands();
        self.sample_step()
    }

    /// Fills an interleaved output buffer, draining pending commands once
    /// up front. The same sample is written to every channel of a frame.
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        self.drain_commands();
        for frame in buffer.chunks_mut(channels.max(1)) {
            let sample = self.sample_step();
            frame.fill(sample);
        }
    }

    fn sample_step(&mut self) -> f32 {
        let sample = self.active.run_sample(self.dt) * self.master_gain;
        self.samples_elapsed += 1;
        sample
    }

    /// Sample rate this engine was created with, in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Seconds of audio rendered since creation or the last reset.
    pub fn elapsed_seconds(&self) -> f64 {
        self.samples_elapsed as f64 * f64::from(self.dt)
    }

    /// Current output scaling factor in `[0, 1]`.
    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Epoch of the plan currently rendering.
    pub fn active_epoch(&self) -> u64 {
        self.active.epoch()
    }
}
