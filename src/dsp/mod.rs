//! DSP: sine synthesis, WAV encoding, and note/frequency helpers.
//!
//! Everything here is pure and deterministic; the same code renders loops for
//! the native controller and for the WASM front end.

pub mod notes;
pub mod oscillator;
pub mod wav;
