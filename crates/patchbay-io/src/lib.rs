//! Host audio boundary for patchbay.
//!
//! This crate connects a [`RenderEngine`](patchbay_core::RenderEngine) to
//! the outside world:
//!
//! - **Live output**: [`OutputStream`] drives the engine from the host's
//!   default output device via cpal
//! - **Offline rendering**: [`render_wav`] bounces a fixed duration to a
//!   WAV file via hound
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use patchbay_core::engine_link;
//! use patchbay_io::{OutputStream, default_output_rate};
//!
//! let sample_rate = default_output_rate()?;
//! let (mut controller, engine) = engine_link(sample_rate as f32);
//! controller.publish(&graph)?;
//!
//! let _stream = OutputStream::start(engine)?;
//! // audio plays until the stream is dropped
//! ```

mod stream;
mod wav;

pub use stream::{OutputStream, default_output_rate};
pub use wav::{WavSpec, render_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format or bit depth is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Filesystem error outside of WAV encoding itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
