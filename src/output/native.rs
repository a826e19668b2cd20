//! cpal-backed audio output.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{AudioOutput, LoopCursor};
use crate::config::ToneConfig;
use crate::dsp::wav;
use crate::error::OutputError;
use crate::tone::RenderedBuffer;

/// Wrapper to hold a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` on some platforms. The session is only touched
/// through the owning controller, which serializes every call, and the
/// stream is dropped on the same logical owner that created it.
pub struct CpalSession(cpal::Stream);

// SAFETY: sessions are only created, stored and dropped by a single
// controller whose operations never run concurrently.
unsafe impl Send for CpalSession {}

struct ActiveRoute {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

/// Plays rendered buffers on a cpal output device.
pub struct CpalOutput {
    output_device_index: Option<usize>,
    route: Option<ActiveRoute>,
}

impl CpalOutput {
    pub fn new(output_device_index: Option<usize>) -> Self {
        CpalOutput {
            output_device_index,
            route: None,
        }
    }

    /// Use the device selected by `outputDevice` in the config.
    pub fn from_config(config: &ToneConfig) -> Self {
        Self::new(config.output_device)
    }

    pub fn output_device(&self) -> Option<usize> {
        self.output_device_index
    }

    pub fn set_output_device(&mut self, index: Option<usize>) {
        self.output_device_index = index;
    }

    pub fn is_active(&self) -> bool {
        self.route.is_some()
    }

    /// List available output devices.
    pub fn list_output_devices() -> Result<Vec<String>, OutputError> {
        let host = cpal::default_host();
        host.output_devices()
            .map_err(|e| OutputError::Device(e.to_string()))?
            .enumerate()
            .map(|(idx, device)| -> Result<String, OutputError> {
                let name = device.name().map_err(|e| OutputError::Device(e.to_string()))?;
                Ok(format!("{idx}: {name}"))
            })
            .collect()
    }

    fn get_device(index: Option<usize>) -> Result<cpal::Device, OutputError> {
        let host = cpal::default_host();

        if let Some(idx) = index {
            let devices: Vec<_> = host
                .output_devices()
                .map_err(|e| OutputError::Device(e.to_string()))?
                .collect();

            let device_count = devices.len();
            devices.into_iter().nth(idx).ok_or_else(|| {
                OutputError::Device(format!(
                    "Output device index {idx} out of range (available: {device_count})"
                ))
            })
        } else {
            host.default_output_device().ok_or(OutputError::NoDevice)
        }
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        mut cursor: LoopCursor,
    ) -> Result<cpal::Stream, OutputError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let value = T::from_sample(cursor.next_sample());
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                |err| tracing::warn!("Output stream error: {err}"),
                None,
            )
            .map_err(|e| OutputError::Stream(e.to_string()))
    }
}

impl AudioOutput for CpalOutput {
    type Session = CpalSession;

    fn activate(&mut self) -> Result<(), OutputError> {
        if self.route.is_some() {
            return Ok(());
        }

        let device = Self::get_device(self.output_device_index)?;
        let config = device
            .default_output_config()
            .map_err(|e| OutputError::Device(e.to_string()))?;

        tracing::debug!(
            "Activated output device {:?} at {} Hz, {} channels",
            device.name().ok(),
            config.sample_rate().0,
            config.channels()
        );
        self.route = Some(ActiveRoute { device, config });
        Ok(())
    }

    fn play(&mut self, buffer: &RenderedBuffer, looping: bool) -> Result<CpalSession, OutputError> {
        let route = self.route.as_ref().ok_or(OutputError::NoDevice)?;

        let (info, samples) = wav::decode_samples(buffer.bytes())?;
        let device_rate = route.config.sample_rate().0;
        let cursor = LoopCursor::new(Arc::from(samples), info.sample_rate, device_rate, looping);
        let stream_config: cpal::StreamConfig = route.config.clone().into();

        let stream = match route.config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(&route.device, &stream_config, cursor)?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(&route.device, &stream_config, cursor)?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(&route.device, &stream_config, cursor)?,
            format => {
                return Err(OutputError::Stream(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        stream.play().map_err(|e| OutputError::Stream(e.to_string()))?;
        Ok(CpalSession(stream))
    }

    fn stop(&mut self, session: CpalSession) {
        if let Err(e) = session.0.pause() {
            tracing::debug!("Pausing stream before drop failed: {e}");
        }
    }

    fn deactivate(&mut self) {
        if self.route.take().is_some() {
            tracing::debug!("Released output device");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_selects_configured_device() {
        let config = ToneConfig::from_json(r#"{"outputDevice": 1}"#).unwrap();
        let output = CpalOutput::from_config(&config);
        assert_eq!(output.output_device(), Some(1));
        assert!(!output.is_active());

        let output = CpalOutput::from_config(&ToneConfig::default());
        assert_eq!(output.output_device(), None);
    }
}
