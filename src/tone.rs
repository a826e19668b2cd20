//! Tone parameters and the rendered loop buffer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ToneConfig;
use crate::dsp::wav::{self, EncodeError, SampleFormat};

/// Frequency and amplitude of the reference tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneParameters {
    /// Hz.
    pub frequency: f64,
    /// Linear gain in `[0, 1]`.
    pub amplitude: f64,
}

/// One loop period of the tone, encoded as a WAV file.
///
/// Immutable once rendered; cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBuffer {
    bytes: Arc<[u8]>,
    params: ToneParameters,
    sample_rate: u32,
    duration: f64,
    format: SampleFormat,
}

impl RenderedBuffer {
    /// Render `params` with the loop length, rate and format from `config`.
    pub fn render(params: ToneParameters, config: &ToneConfig) -> Result<Self, EncodeError> {
        let bytes = wav::encode_tone(
            params.frequency,
            params.amplitude,
            config.loop_duration,
            config.sample_rate,
            config.sample_format,
        )?;

        Ok(RenderedBuffer {
            bytes: bytes.into(),
            params,
            sample_rate: config.sample_rate,
            duration: config.loop_duration,
            format: config.sample_format,
        })
    }

    /// The complete WAV file.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn params(&self) -> ToneParameters {
        self.params
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Requested loop duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Whether this buffer was rendered from exactly `params` under `config`.
    pub fn matches(&self, params: ToneParameters, config: &ToneConfig) -> bool {
        self.params == params
            && self.sample_rate == config.sample_rate
            && self.duration == config.loop_duration
            && self.format == config.sample_format
    }
}
