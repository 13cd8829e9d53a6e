//! Poll-driven PWM gesture sequencer
//!
//! A sequence is an ordered list of [`Step`]s. Each step emits a PWM signal
//! whose frequency alternates between the primary and secondary values a
//! fixed number of times, then goes silent for the step's post-delay.
//! The [`SequenceEngine`] advances through the steps whenever `update()` is
//! polled; it never blocks and owns no timers of its own.

pub mod engine;
pub mod state;
pub mod step;

#[cfg(test)]
pub(crate) mod mock;

pub use engine::{Bindings, SequenceEngine, SequencerError, DEFAULT_CAPACITY};
pub use state::{Phase, PlaybackState, SharedPlayback};
pub use step::{Step, StepKind};
