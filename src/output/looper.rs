//! Sample cursor that repeats a rendered loop at an arbitrary device rate.

use std::sync::Arc;

/// Reads a mono loop, wrapping at the end.
///
/// When the device rate differs from the loop's rate the cursor advances by
/// `source_rate / device_rate` per output frame and interpolates linearly
/// between neighbouring samples.
#[derive(Debug, Clone)]
pub struct LoopCursor {
    samples: Arc<[f32]>,
    position: f64,
    step: f64,
    looping: bool,
}

impl LoopCursor {
    pub fn new(samples: Arc<[f32]>, source_rate: u32, device_rate: u32, looping: bool) -> Self {
        let step = if device_rate > 0 {
            source_rate as f64 / device_rate as f64
        } else {
            1.0
        };
        LoopCursor {
            samples,
            position: 0.0,
            step,
            looping,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Whether a one-shot cursor has played all of its samples.
    pub fn is_finished(&self) -> bool {
        !self.looping && self.position >= self.samples.len() as f64
    }

    /// Next output sample; silence once a one-shot cursor is finished.
    pub fn next_sample(&mut self) -> f32 {
        let len = self.samples.len();
        if len == 0 || self.is_finished() {
            return 0.0;
        }

        let index = self.position as usize;
        let frac = (self.position - index as f64) as f32;
        let current = self.samples[index];
        let next = match self.samples.get(index + 1) {
            Some(&s) => s,
            None if self.looping => self.samples[0],
            None => current,
        };

        self.position += self.step;
        if self.looping && self.position >= len as f64 {
            self.position %= len as f64;
        }

        current + (next - current) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Arc<[f32]> {
        (0..n).map(|i| i as f32).collect::<Vec<_>>().into()
    }

    #[test]
    fn same_rate_repeats_exactly() {
        let mut cursor = LoopCursor::new(ramp(4), 44100, 44100, true);
        let out: Vec<f32> = (0..10).map(|_| cursor.next_sample()).collect();
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn one_shot_goes_silent() {
        let mut cursor = LoopCursor::new(ramp(3), 48000, 48000, false);
        let out: Vec<f32> = (0..5).map(|_| cursor.next_sample()).collect();
        assert_eq!(out, vec![0.0, 1.0, 2.0, 0.0, 0.0]);
        assert!(cursor.is_finished());
    }

    #[test]
    fn upsampling_interpolates() {
        // 22050 → 44100 Hz: half-sample steps
        let mut cursor = LoopCursor::new(ramp(4), 22050, 44100, true);
        assert_eq!(cursor.step(), 0.5);
        let out: Vec<f32> = (0..4).map(|_| cursor.next_sample()).collect();
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn interpolation_wraps_to_loop_start() {
        let mut cursor = LoopCursor::new(ramp(2), 1, 2, true);
        let out: Vec<f32> = (0..4).map(|_| cursor.next_sample()).collect();
        // last half-step blends sample 1 back toward sample 0
        assert_eq!(out, vec![0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn empty_loop_is_silent() {
        let mut cursor = LoopCursor::new(Arc::from(Vec::new()), 44100, 44100, true);
        assert_eq!(cursor.next_sample(), 0.0);
    }
}
