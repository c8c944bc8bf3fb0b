//! Live playback command.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Args;
use patchbay_core::engine_link;
use patchbay_io::{OutputStream, default_output_rate};
use patchbay_project::Project;

#[derive(Args)]
pub struct PlayArgs {
    /// Project file (JSON)
    project: PathBuf,

    /// Master gain in [0, 1] (default: the engine's built-in default)
    #[arg(long)]
    master_gain: Option<f32>,

    /// Sample rate in Hz (default: the output device's rate)
    #[arg(long)]
    sample_rate: Option<u32>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let project = Project::load(&args.project)?;

    let sample_rate = match args.sample_rate {
        Some(rate) => rate,
        None => default_output_rate()?,
    };

    let (mut controller, engine) = engine_link(sample_rate as f32);
    if let Some(gain) = args.master_gain {
        controller
            .set_master_gain(gain)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    controller
        .publish(&project.model)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!(
        "Playing {} ({} modules, {} connections)",
        args.project.display(),
        project.model.node_count(),
        project.model.edge_count()
    );
    println!("  Sample rate: {} Hz", sample_rate);
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let _stream = OutputStream::start(engine)?;

    while running.load(Ordering::SeqCst) {
        // Reclaim plans the engine has retired.
        controller.collect_retired();
        std::thread::sleep(Duration::from_millis(100));
    }

    println!("Done!");
    Ok(())
}
