pub mod config;
pub mod controller;
pub mod dsp;
pub mod error;
pub mod output;
pub mod tone;

pub use config::ToneConfig;
pub use controller::{PlaybackState, SharedToneController, ToneController, ToneState};
pub use error::{OutputError, ToneError};
pub use output::AudioOutput;
pub use tone::{RenderedBuffer, ToneParameters};

use crate::dsp::wav::SampleFormat;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the pitchpipe-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: render one loop of a sine tone to a float32 WAV byte array.
#[wasm_bindgen]
pub fn render_tone_wav(
    frequency: f64,
    amplitude: f64,
    duration: f64,
    sample_rate: u32,
) -> Result<Vec<u8>, JsValue> {
    dsp::wav::encode_tone(frequency, amplitude, duration, sample_rate, SampleFormat::Float32)
        .map_err(js_error)
}

/// WASM-exposed: render a loop using a JSON `ToneConfig` (loop length, rate, format).
#[wasm_bindgen]
pub fn render_tone_wav_with_config(
    frequency: f64,
    amplitude: f64,
    config_json: &str,
) -> Result<Vec<u8>, JsValue> {
    render_with_config(frequency, amplitude, config_json).map_err(js_error)
}

/// WASM-exposed: frequency of a note name ("C5", "F#3") at the given A4 pitch.
#[wasm_bindgen]
pub fn note_frequency(note: &str, tuning_pitch: f64) -> Result<f64, JsValue> {
    resolve_note(note, tuning_pitch).map_err(js_error)
}

/// WASM-exposed: nearest note name and cent offset for a dialed frequency,
/// or `undefined` for silence.
#[wasm_bindgen]
pub fn nearest_note(frequency: f64, tuning_pitch: f64) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&dsp::notes::nearest_note(frequency, tuning_pitch))
        .map_err(js_error)
}

/// WASM-exposed: the default configuration as a JS object.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&ToneConfig::default()).map_err(js_error)
}

fn render_with_config(frequency: f64, amplitude: f64, config_json: &str) -> error::Result<Vec<u8>> {
    let config = ToneConfig::from_json(config_json)?;
    let params = ToneParameters {
        frequency: config.check_frequency(frequency)?,
        amplitude,
    };
    let buffer = RenderedBuffer::render(params, &config)?;
    Ok(buffer.bytes().to_vec())
}

fn resolve_note(note: &str, tuning_pitch: f64) -> error::Result<f64> {
    dsp::notes::note_to_frequency_with_tuning(note, tuning_pitch)
        .ok_or_else(|| ToneError::UnknownNote(note.to_string()))
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_tone_wav_matches_scenario_length() {
        let wav = render_tone_wav(440.0, 0.45, 0.35, 44100).unwrap();
        assert_eq!(wav.len(), 61784);
    }

    #[test]
    fn render_with_config_honours_format() {
        let wav = render_tone_wav_with_config(440.0, 0.5, r#"{"sampleFormat": "int16", "loopDuration": 0.1}"#)
            .unwrap();
        let info = dsp::wav::WavInfo::parse(&wav).unwrap();
        assert_eq!(info.format, SampleFormat::Int16);
        assert_eq!(info.frames(), 4410);
    }

    #[test]
    fn note_frequency_resolves() {
        let f = note_frequency("C5", 440.0).unwrap();
        assert!((f - 523.25).abs() < 0.01);
    }

    #[test]
    fn core_version_matches_cargo() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    // Error paths are checked on the helpers: building a JsValue needs a JS host.

    #[test]
    fn config_render_rejects_above_nyquist() {
        let err = render_with_config(22_051.0, 0.5, "{}").unwrap_err();
        assert!(matches!(err, ToneError::InvalidParameter { name: "frequency", .. }));
        assert!(render_with_config(22_050.0, 0.5, "{}").is_ok());
    }

    #[test]
    fn config_render_rejects_bad_json() {
        assert!(matches!(
            render_with_config(440.0, 0.5, "{sampleRate"),
            Err(ToneError::ConfigParse(_))
        ));
        assert!(matches!(
            render_with_config(440.0, 0.5, r#"{"sampleRate": 0}"#),
            Err(ToneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unknown_note_is_reported() {
        let err = resolve_note("H4", 440.0).unwrap_err();
        assert!(matches!(err, ToneError::UnknownNote(ref n) if n == "H4"));
    }

    #[test]
    fn exported_objects_use_camel_case() {
        // Same Serialize impls that serde_wasm_bindgen hands to JS
        let config = serde_json::to_value(ToneConfig::default()).unwrap();
        assert_eq!(config["sampleRate"], 44100);
        assert_eq!(config["sampleFormat"], "float32");
        assert!(config.get("outputDevice").is_none());

        let note = serde_json::to_value(dsp::notes::nearest_note(523.25, 440.0)).unwrap();
        assert_eq!(note["name"], "C5");
        assert_eq!(note["midi"], 72);
        assert!(serde_json::to_value(dsp::notes::nearest_note(0.0, 440.0)).unwrap().is_null());
    }
}
