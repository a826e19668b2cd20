//! Sine oscillator with a wrapped phase accumulator.

use std::f64::consts::TAU;

/// A mono sine oscillator.
///
/// Phase is kept in radians and wrapped into `[0, 2π)` after every step, so
/// long renders never accumulate an unbounded phase value.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    pub frequency: f64,
    pub amplitude: f64,
    phase: f64,
    sample_rate: f64,
}

impl SineOscillator {
    pub fn new(frequency: f64, amplitude: f64, sample_rate: f64) -> Self {
        SineOscillator {
            frequency,
            amplitude,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Phase increment per sample, in radians.
    fn phase_inc(&self) -> f64 {
        if self.sample_rate > 0.0 {
            TAU * self.frequency / self.sample_rate
        } else {
            0.0
        }
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let sample = self.phase.sin() * self.amplitude;

        self.phase = (self.phase + self.phase_inc()) % TAU;
        if self.phase < 0.0 {
            self.phase += TAU;
        }

        sample
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Reset oscillator phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Iterator for SineOscillator {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_sample())
    }
}
