//! Audio output boundary.
//!
//! The controller never talks to a device directly. It drives an
//! [`AudioOutput`], which owns the platform route and hands back a session
//! handle for each buffer it loops.

pub mod looper;
#[cfg(feature = "native-output")]
pub mod native;

pub use looper::LoopCursor;
#[cfg(feature = "native-output")]
pub use native::{CpalOutput, CpalSession};

use crate::error::OutputError;
use crate::tone::RenderedBuffer;

/// A platform audio-output service.
///
/// Call order is `activate`, then any number of `play`/`stop` pairs, then
/// `deactivate`. A backend plays at most one session at a time.
pub trait AudioOutput {
    /// Handle to a playing buffer. Dropping it without `stop` is a backend-specific leak.
    type Session;

    /// Acquire the output route (device, focus, permission).
    fn activate(&mut self) -> Result<(), OutputError>;

    /// Start playing `buffer`, repeating it indefinitely when `looping` is set.
    fn play(&mut self, buffer: &RenderedBuffer, looping: bool) -> Result<Self::Session, OutputError>;

    /// Halt a session immediately.
    fn stop(&mut self, session: Self::Session);

    /// Release the output route so other audio consumers can claim it.
    fn deactivate(&mut self);
}
