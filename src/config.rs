//! Tone and output configuration.

use serde::{Deserialize, Serialize};

use crate::tone::ToneParameters;
use crate::dsp::wav::SampleFormat;
use crate::error::{Result, ToneError};

/// Highest accepted loop sample rate, in Hz.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

fn default_sample_rate() -> u32 {
    44100
}

fn default_loop_duration() -> f64 {
    0.35
}

fn default_frequency() -> f64 {
    440.0
}

fn default_amplitude() -> f64 {
    0.45
}

fn default_tuning_pitch() -> f64 {
    440.0
}

/// Configuration for a [`ToneController`](crate::controller::ToneController).
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneConfig {
    /// Sample rate of the rendered loop, in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Length of one rendered loop period, in seconds.
    #[serde(default = "default_loop_duration")]
    pub loop_duration: f64,
    /// Initial tone frequency, in Hz.
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    /// Initial tone amplitude in `[0, 1]`.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub sample_format: SampleFormat,
    /// Frequency of A4 used when resolving note names.
    #[serde(default = "default_tuning_pitch")]
    pub tuning_pitch: f64,
    /// Output device index for native backends; `None` selects the default device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_device: Option<usize>,
}

impl Default for ToneConfig {
    fn default() -> Self {
        ToneConfig {
            sample_rate: default_sample_rate(),
            loop_duration: default_loop_duration(),
            frequency: default_frequency(),
            amplitude: default_amplitude(),
            sample_format: SampleFormat::default(),
            tuning_pitch: default_tuning_pitch(),
            output_device: None,
        }
    }
}

impl ToneConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ToneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(ToneError::InvalidConfig(format!(
                "sampleRate must be between 1 and {MAX_SAMPLE_RATE} Hz, got {}",
                self.sample_rate
            )));
        }
        if !(self.loop_duration.is_finite() && self.loop_duration > 0.0) {
            return Err(ToneError::InvalidConfig(format!(
                "loopDuration must be a positive number of seconds, got {}",
                self.loop_duration
            )));
        }
        if !(self.tuning_pitch.is_finite() && self.tuning_pitch > 0.0) {
            return Err(ToneError::InvalidConfig(format!(
                "tuningPitch must be positive, got {}",
                self.tuning_pitch
            )));
        }
        self.initial_parameters().map(|_| ())
    }

    /// Highest frequency representable at the configured sample rate.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// The configured starting frequency and amplitude, validated.
    pub fn initial_parameters(&self) -> Result<ToneParameters> {
        Ok(ToneParameters {
            frequency: self.check_frequency(self.frequency)?,
            amplitude: check_amplitude(self.amplitude)?,
        })
    }

    /// Reject frequencies the encoder cannot represent.
    pub(crate) fn check_frequency(&self, frequency: f64) -> Result<f64> {
        if frequency.is_finite() && (0.0..=self.nyquist()).contains(&frequency) {
            Ok(frequency)
        } else {
            Err(ToneError::InvalidParameter {
                name: "frequency",
                value: frequency,
            })
        }
    }
}

/// Clamp an amplitude into `[0, 1]`; only non-finite values are rejected.
pub(crate) fn check_amplitude(amplitude: f64) -> Result<f64> {
    if amplitude.is_finite() {
        Ok(amplitude.clamp(0.0, 1.0))
    } else {
        Err(ToneError::InvalidParameter {
            name: "amplitude",
            value: amplitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = ToneConfig::from_json("{}").unwrap();
        assert_eq!(config, ToneConfig::default());
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.loop_duration, 0.35);
        assert_eq!(config.sample_format, SampleFormat::Float32);
    }

    #[test]
    fn camel_case_fields() {
        let config = ToneConfig::from_json(
            r#"{"sampleRate": 48000, "loopDuration": 0.5, "sampleFormat": "int16", "tuningPitch": 432, "outputDevice": 1}"#,
        )
        .unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.loop_duration, 0.5);
        assert_eq!(config.sample_format, SampleFormat::Int16);
        assert_eq!(config.tuning_pitch, 432.0);
        assert_eq!(config.output_device, Some(1));
    }

    #[test]
    fn serialize_roundtrip() {
        let config = ToneConfig {
            frequency: 293.66,
            ..ToneConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"loopDuration\""));
        assert!(!json.contains("outputDevice"));
        assert_eq!(ToneConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ToneConfig::from_json(r#"{"sampleRate": 0}"#),
            Err(ToneError::InvalidConfig(_))
        ));
        assert!(matches!(
            ToneConfig::from_json(r#"{"sampleRate": 2000000000}"#),
            Err(ToneError::InvalidConfig(_))
        ));
        assert!(matches!(
            ToneConfig::from_json(r#"{"loopDuration": -1}"#),
            Err(ToneError::InvalidConfig(_))
        ));
        assert!(matches!(
            ToneConfig::from_json(r#"{"frequency": 30000}"#),
            Err(ToneError::InvalidParameter { name: "frequency", .. })
        ));
        assert!(matches!(
            ToneConfig::from_json(r#"{"sampleFormat": "mp3"}"#),
            Err(ToneError::ConfigParse(_))
        ));
    }

    #[test]
    fn sample_rate_limit_is_inclusive() {
        let config = ToneConfig {
            sample_rate: MAX_SAMPLE_RATE,
            ..ToneConfig::default()
        };
        assert!(config.validate().is_ok());
        let config = ToneConfig {
            sample_rate: MAX_SAMPLE_RATE + 1,
            ..ToneConfig::default()
        };
        assert!(matches!(config.validate(), Err(ToneError::InvalidConfig(_))));
    }

    #[test]
    fn amplitude_clamps() {
        assert_eq!(check_amplitude(1.5).unwrap(), 1.0);
        assert_eq!(check_amplitude(-0.2).unwrap(), 0.0);
        assert!(check_amplitude(f64::INFINITY).is_err());
    }
}
