use thiserror::Error;

use crate::dsp::wav::{EncodeError, WavError};

#[derive(Error, Debug)]
pub enum ToneError {
    #[error("Audio output unavailable: {0}")]
    AudioUnavailable(#[from] OutputError),

    #[error("Failed to encode tone buffer: {0}")]
    EncodingFailure(#[from] EncodeError),

    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Unknown note '{0}'")]
    UnknownNote(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Errors reported by an [`AudioOutput`](crate::output::AudioOutput) backend.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("No output device available")]
    NoDevice,

    #[error("Output device error: {0}")]
    Device(String),

    #[error("Output stream error: {0}")]
    Stream(String),

    #[error("Buffer is not playable: {0}")]
    InvalidBuffer(#[from] WavError),
}

pub type Result<T> = std::result::Result<T, ToneError>;
