//! Offline rendering to WAV files.

use std::path::Path;

use hound::{SampleFormat, WavWriter};

use patchbay_core::RenderEngine;

use crate::{Error, Result};

/// WAV file specification for offline rendering.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample: 16 (integer PCM) or 32 (IEEE float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Renders `seconds` of audio from the engine into a WAV file.
///
/// The engine is driven one sample at a time; each frame carries the same
/// mono mix on every channel, matching live output. The engine should have
/// been created with `spec.sample_rate`.
///
/// Only 16-bit PCM and 32-bit float are supported.
pub fn render_wav(
    engine: &mut RenderEngine,
    path: impl AsRef<Path>,
    seconds: f64,
    spec: WavSpec,
) -> Result<()> {
    if spec.bits_per_sample != 16 && spec.bits_per_sample != 32 {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit WAV",
            spec.bits_per_sample
        )));
    }

    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let frames = (seconds * f64::from(spec.sample_rate)).round() as u64;
    let mut writer = WavWriter::create(path, spec.into())?;

    if spec.bits_per_sample == 32 {
        for _ in 0..frames {
            let sample = engine.next_sample();
            for _ in 0..spec.channels {
                writer.write_sample(sample)?;
            }
        }
    } else {
        for _ in 0..frames {
            let sample = engine.next_sample().clamp(-1.0, 1.0);
            let quantized = (sample * f32::from(i16::MAX)) as i16;
            for _ in 0..spec.channels {
                writer.write_sample(quantized)?;
            }
        }
    }

    writer.finalize()?;
    tracing::info!(path = %path.display(), frames, "wav render complete");
    Ok(())
}
