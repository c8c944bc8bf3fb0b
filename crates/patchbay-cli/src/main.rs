//! Patchbay CLI - play, render, and inspect signal-graph projects.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(author, version, about = "Signal-graph synthesizer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a project live on the default output device
    Play(commands::play::PlayArgs),

    /// Render a project offline to a WAV file
    Render(commands::render::RenderArgs),

    /// Load and compile a project, printing plan diagnostics
    Check(commands::check::CheckArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Check(args) => commands::check::run(args),
    }
}
