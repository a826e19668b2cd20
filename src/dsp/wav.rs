//! WAV encoder: renders one loop period of a sine tone to a RIFF/WAVE byte buffer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::oscillator::SineOscillator;

/// Size of the canonical RIFF/WAVE header written by [`encode_tone`].
pub const HEADER_LEN: usize = 44;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

/// PCM sample encoding of the rendered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 32-bit IEEE float (WAVE format tag 3).
    #[default]
    Float32,
    /// 16-bit signed integer (WAVE format tag 1).
    Int16,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> u16 {
        match self {
            SampleFormat::Float32 => 4,
            SampleFormat::Int16 => 2,
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        self.bytes_per_sample() * 8
    }

    fn format_tag(self) -> u16 {
        match self {
            SampleFormat::Float32 => FORMAT_IEEE_FLOAT,
            SampleFormat::Int16 => FORMAT_PCM,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("byte rate for {sample_rate} Hz does not fit in a WAV header")]
    ByteRateOverflow { sample_rate: u32 },

    #[error("{samples} samples do not fit in a RIFF container")]
    PayloadTooLarge { samples: u64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WavError {
    #[error("buffer is {0} bytes, shorter than a WAV header")]
    TooShort(usize),

    #[error("missing '{0}' chunk id")]
    MissingChunk(&'static str),

    #[error("unsupported format tag {tag} with {bits} bits per sample")]
    UnsupportedFormat { tag: u16, bits: u16 },

    #[error("header declares {declared} data bytes but {actual} are present")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("inconsistent header field: {0}")]
    Inconsistent(&'static str),
}

/// Number of samples rendered for `duration` seconds at `sample_rate`.
///
/// Non-finite or non-positive durations render zero samples.
pub fn sample_count(duration: f64, sample_rate: u32) -> u64 {
    let n = (duration * sample_rate as f64).round();
    if n.is_finite() && n > 0.0 { n as u64 } else { 0 }
}

/// Render `duration` seconds of a mono sine tone as a complete WAV file.
///
/// `amplitude` is clamped to `[0, 1]`; NaN frequency or amplitude render
/// silence. Phase starts at zero, so the same inputs always produce
/// byte-identical output.
pub fn encode_tone(
    frequency: f64,
    amplitude: f64,
    duration: f64,
    sample_rate: u32,
    format: SampleFormat,
) -> Result<Vec<u8>, EncodeError> {
    if sample_rate == 0 {
        return Err(EncodeError::ZeroSampleRate);
    }

    let frequency = if frequency.is_finite() { frequency } else { 0.0 };
    let amplitude = if amplitude.is_nan() { 0.0 } else { amplitude.clamp(0.0, 1.0) };

    let byte_rate = sample_rate
        .checked_mul(format.bytes_per_sample() as u32)
        .ok_or(EncodeError::ByteRateOverflow { sample_rate })?;

    let samples = sample_count(duration, sample_rate);
    let bytes_per_sample = format.bytes_per_sample() as u64;
    let data_size = samples
        .checked_mul(bytes_per_sample)
        .filter(|&size| size <= (u32::MAX - 36) as u64)
        .ok_or(EncodeError::PayloadTooLarge { samples })? as u32;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);
    write_header(&mut buf, sample_rate, byte_rate, format, data_size);

    let osc = SineOscillator::new(frequency, amplitude, sample_rate as f64);
    for value in osc.take(samples as usize) {
        match format {
            SampleFormat::Float32 => buf.extend_from_slice(&(value as f32).to_le_bytes()),
            SampleFormat::Int16 => {
                let scaled = (value * i16::MAX as f64).round() as i16;
                buf.extend_from_slice(&scaled.to_le_bytes());
            }
        }
    }

    Ok(buf)
}

fn write_header(
    buf: &mut Vec<u8>,
    sample_rate: u32,
    byte_rate: u32,
    format: SampleFormat,
    data_size: u32,
) {
    let channels: u16 = 1;
    let bits_per_sample = format.bits_per_sample();
    let block_align = format.bytes_per_sample();
    let file_size = 36 + data_size;

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&format.format_tag().to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
}

/// Fields of a canonical 44-byte WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub format: SampleFormat,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavInfo {
    /// Parse and validate a canonical header (`fmt ` immediately followed by `data`).
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < HEADER_LEN {
            return Err(WavError::TooShort(bytes.len()));
        }
        if &bytes[0..4] != b"RIFF" {
            return Err(WavError::MissingChunk("RIFF"));
        }
        if &bytes[8..12] != b"WAVE" {
            return Err(WavError::MissingChunk("WAVE"));
        }
        if &bytes[12..16] != b"fmt " {
            return Err(WavError::MissingChunk("fmt "));
        }
        if &bytes[36..40] != b"data" {
            return Err(WavError::MissingChunk("data"));
        }

        let tag = read_u16(bytes, 20);
        let bits_per_sample = read_u16(bytes, 34);
        let format = match (tag, bits_per_sample) {
            (FORMAT_IEEE_FLOAT, 32) => SampleFormat::Float32,
            (FORMAT_PCM, 16) => SampleFormat::Int16,
            (tag, bits) => return Err(WavError::UnsupportedFormat { tag, bits }),
        };

        let info = WavInfo {
            format,
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample,
            data_len: read_u32(bytes, 40),
        };

        if read_u32(bytes, 16) != 16 {
            return Err(WavError::Inconsistent("fmt chunk size"));
        }
        if info.channels == 0 {
            return Err(WavError::Inconsistent("channel count"));
        }
        if info.channels.checked_mul(format.bytes_per_sample()) != Some(info.block_align) {
            return Err(WavError::Inconsistent("block align"));
        }
        if info.sample_rate.checked_mul(info.block_align as u32) != Some(info.byte_rate) {
            return Err(WavError::Inconsistent("byte rate"));
        }
        if read_u32(bytes, 4) as u64 != 36 + info.data_len as u64 {
            return Err(WavError::Inconsistent("RIFF size"));
        }

        let actual = bytes.len() - HEADER_LEN;
        if actual != info.data_len as usize {
            return Err(WavError::SizeMismatch {
                declared: info.data_len as usize,
                actual,
            });
        }

        Ok(info)
    }

    /// Number of sample frames in the payload.
    pub fn frames(&self) -> usize {
        self.data_len as usize / self.block_align as usize
    }

    /// Payload duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Decode a WAV buffer into interleaved f32 samples.
pub fn decode_samples(bytes: &[u8]) -> Result<(WavInfo, Vec<f32>), WavError> {
    let info = WavInfo::parse(bytes)?;
    let payload = &bytes[HEADER_LEN..];

    let samples = match info.format {
        SampleFormat::Float32 => payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        SampleFormat::Int16 => payload
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / i16::MAX as f32)
            .collect(),
    };

    Ok((info, samples))
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
