//! Subcommand implementations.

pub mod check;
pub mod play;
pub mod render;
