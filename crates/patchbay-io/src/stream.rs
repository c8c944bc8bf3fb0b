//! Live audio output via cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;

use patchbay_core::RenderEngine;

use crate::{Error, Result};

/// Default sample rate of the host's default output device, in Hz.
///
/// Query this before building the engine so the engine's sample period
/// matches the device.
pub fn default_output_rate() -> Result<u32> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(Error::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| Error::Stream(e.to_string()))?;
    Ok(config.sample_rate())
}

/// A running output stream owning a [`RenderEngine`].
///
/// The cpal data callback calls [`RenderEngine::render`] directly; every
/// channel of a frame carries the identical mono mix. Audio plays from
/// [`start()`](Self::start) until the stream is dropped. The stream is not
/// `Send`: keep it on the thread that created it.
pub struct OutputStream {
    _stream: Stream,
    channels: u16,
    sample_rate: u32,
}

impl OutputStream {
    /// Opens the default output device and starts rendering.
    ///
    /// The engine must have been created for the device's sample rate (see
    /// [`default_output_rate`]); only f32 output formats are supported.
    pub fn start(mut engine: RenderEngine) -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(Error::UnsupportedFormat(format!(
                "{:?}",
                config.sample_format()
            )));
        }

        let channels = config.channels();
        let sample_rate = config.sample_rate();
        tracing::info!(channels, sample_rate, "output stream starting");

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    engine.render(data, channels as usize);
                },
                |err| tracing::error!("output stream error: {err}"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            channels,
            sample_rate,
        })
    }

    /// Channel count of the running stream.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate of the running stream, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
