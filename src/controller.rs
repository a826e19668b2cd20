//! Playback controller: owns the tone parameters and the rendered loop, and
//! drives an [`AudioOutput`] through the Idle/Playing state machine.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::{ToneConfig, check_amplitude};
use crate::dsp::notes::{self, NearestNote};
use crate::error::{Result, ToneError};
use crate::output::AudioOutput;
use crate::tone::{RenderedBuffer, ToneParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Read-only snapshot for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneState {
    pub frequency: f64,
    pub amplitude: f64,
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_note: Option<NearestNote>,
}

/// Loops a sine tone through an output backend and rebuilds it when the
/// frequency or amplitude changes.
///
/// The controller is Playing exactly when it holds a session. While Playing,
/// the buffer handed to the backend always matches the current parameters:
/// every change stops the session, re-renders, and plays again.
pub struct ToneController<O: AudioOutput> {
    output: O,
    config: ToneConfig,
    params: ToneParameters,
    buffer: Option<RenderedBuffer>,
    session: Option<O::Session>,
}

impl<O: AudioOutput> ToneController<O> {
    /// Create an Idle controller with the initial tone from `config`.
    pub fn new(output: O, config: ToneConfig) -> Result<Self> {
        config.validate()?;
        let params = config.initial_parameters()?;
        Ok(ToneController {
            output,
            config,
            params,
            buffer: None,
            session: None,
        })
    }

    pub fn with_default_config(output: O) -> Result<Self> {
        Self::new(output, ToneConfig::default())
    }

    /// Activate the output route and start looping the tone.
    ///
    /// A no-op while already Playing. On failure the route is released
    /// again and the controller stays Idle:
    ///
    /// - route activation or stream start fails: [`ToneError::AudioUnavailable`]
    /// - the loop cannot be rendered: [`ToneError::EncodingFailure`]
    pub fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        if let Err(e) = self.output.activate() {
            tracing::warn!("Could not activate audio output: {e}");
            return Err(ToneError::AudioUnavailable(e));
        }

        match self.begin_playback() {
            Ok(()) => {
                tracing::info!(
                    frequency = self.params.frequency,
                    amplitude = self.params.amplitude,
                    "Tone started"
                );
                Ok(())
            }
            Err(e) => {
                self.output.deactivate();
                tracing::warn!("Tone failed to start: {e}");
                Err(e)
            }
        }
    }

    /// Halt playback and release the output route. Idempotent.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            self.output.stop(session);
            self.output.deactivate();
            tracing::info!("Tone stopped");
        }
    }

    /// Change the frequency, restarting playback if Playing.
    ///
    /// Negative, non-finite, or above-Nyquist frequencies are rejected and
    /// leave the controller untouched.
    pub fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        let frequency = self.config.check_frequency(frequency)?;
        self.apply(ToneParameters {
            frequency,
            ..self.params
        })
    }

    /// Change the amplitude, restarting playback if Playing.
    ///
    /// Values outside `[0, 1]` are clamped; non-finite values are rejected.
    pub fn set_amplitude(&mut self, amplitude: f64) -> Result<()> {
        let amplitude = check_amplitude(amplitude)?;
        self.apply(ToneParameters {
            amplitude,
            ..self.params
        })
    }

    /// Change both parameters with a single rebuild.
    pub fn set_parameters(&mut self, params: ToneParameters) -> Result<()> {
        let params = ToneParameters {
            frequency: self.config.check_frequency(params.frequency)?,
            amplitude: check_amplitude(params.amplitude)?,
        };
        self.apply(params)
    }

    /// Tune to a note name such as "A4" or "Eb3" using the configured tuning pitch.
    pub fn set_note(&mut self, note: &str) -> Result<()> {
        let frequency = notes::note_to_frequency_with_tuning(note, self.config.tuning_pitch)
            .ok_or_else(|| ToneError::UnknownNote(note.to_string()))?;
        self.set_frequency(frequency)
    }

    pub fn frequency(&self) -> f64 {
        self.params.frequency
    }

    pub fn amplitude(&self) -> f64 {
        self.params.amplitude
    }

    pub fn parameters(&self) -> ToneParameters {
        self.params
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn config(&self) -> &ToneConfig {
        &self.config
    }

    /// The most recently rendered loop, if one is cached.
    pub fn buffer(&self) -> Option<&RenderedBuffer> {
        self.buffer.as_ref()
    }

    pub fn state(&self) -> ToneState {
        ToneState {
            frequency: self.params.frequency,
            amplitude: self.params.amplitude,
            is_playing: self.is_playing(),
            nearest_note: notes::nearest_note(self.params.frequency, self.config.tuning_pitch),
        }
    }

    fn apply(&mut self, params: ToneParameters) -> Result<()> {
        if params == self.params {
            return Ok(());
        }
        self.params = params;

        let Some(session) = self.session.take() else {
            // Idle: render lazily on the next start
            self.buffer = None;
            return Ok(());
        };

        self.output.stop(session);
        match self.begin_playback() {
            Ok(()) => {
                tracing::debug!(
                    frequency = params.frequency,
                    amplitude = params.amplitude,
                    "Tone restarted with new parameters"
                );
                Ok(())
            }
            Err(e) => {
                self.output.deactivate();
                tracing::warn!("Tone restart failed, now idle: {e}");
                Err(e)
            }
        }
    }

    /// Play the current buffer on an already activated route.
    fn begin_playback(&mut self) -> Result<()> {
        let buffer = self.current_buffer()?;
        let session = self.output.play(&buffer, true)?;
        self.session = Some(session);
        Ok(())
    }

    /// The cached buffer if it matches the current parameters, otherwise a fresh render.
    fn current_buffer(&mut self) -> Result<RenderedBuffer> {
        if let Some(buffer) = &self.buffer {
            if buffer.matches(self.params, &self.config) {
                return Ok(buffer.clone());
            }
        }

        tracing::debug!(
            frequency = self.params.frequency,
            amplitude = self.params.amplitude,
            "Rendering tone loop"
        );
        let buffer = RenderedBuffer::render(self.params, &self.config)?;
        self.buffer = Some(buffer.clone());
        Ok(buffer)
    }
}

impl<O: AudioOutput> Drop for ToneController<O> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A [`ToneController`] shared between threads.
///
/// Every operation takes the same lock, so transitions never interleave.
pub struct SharedToneController<O: AudioOutput> {
    inner: Arc<Mutex<ToneController<O>>>,
}

impl<O: AudioOutput> Clone for SharedToneController<O> {
    fn clone(&self) -> Self {
        SharedToneController {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: AudioOutput> SharedToneController<O> {
    pub fn new(controller: ToneController<O>) -> Self {
        SharedToneController {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn start(&self) -> Result<()> {
        self.inner.lock().start()
    }

    pub fn stop(&self) {
        self.inner.lock().stop()
    }

    pub fn set_frequency(&self, frequency: f64) -> Result<()> {
        self.inner.lock().set_frequency(frequency)
    }

    pub fn set_amplitude(&self, amplitude: f64) -> Result<()> {
        self.inner.lock().set_amplitude(amplitude)
    }

    pub fn set_parameters(&self, params: ToneParameters) -> Result<()> {
        self.inner.lock().set_parameters(params)
    }

    pub fn set_note(&self, note: &str) -> Result<()> {
        self.inner.lock().set_note(note)
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().is_playing()
    }

    pub fn state(&self) -> ToneState {
        self.inner.lock().state()
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut ToneController<O>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
