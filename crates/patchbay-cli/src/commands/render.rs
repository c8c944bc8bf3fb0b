//! Offline rendering command.

use std::path::PathBuf;

use clap::Args;
use patchbay_core::engine_link;
use patchbay_io::{WavSpec, render_wav};
use patchbay_project::Project;

#[derive(Args)]
pub struct RenderArgs {
    /// Project file (JSON)
    project: PathBuf,

    /// Output WAV path
    #[arg(short, long)]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "5.0")]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Bit depth: 16 (integer PCM) or 32 (IEEE float)
    #[arg(long, default_value = "32")]
    bits: u16,

    /// Channel count
    #[arg(long, default_value = "2")]
    channels: u16,

    /// Master gain in [0, 1] (default: the engine's built-in default)
    #[arg(long)]
    master_gain: Option<f32>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.duration >= 0.0, "duration must be non-negative");

    let project = Project::load(&args.project)?;

    let (mut controller, mut engine) = engine_link(args.sample_rate as f32);
    if let Some(gain) = args.master_gain {
        controller
            .set_master_gain(gain)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    controller
        .publish(&project.model)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let spec = WavSpec {
        channels: args.channels,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bits,
    };
    render_wav(&mut engine, &args.output, args.duration, spec)?;

    println!(
        "Rendered {:.2} s of {} to {}",
        args.duration,
        args.project.display(),
        args.output.display()
    );
    Ok(())
}
