//! Board-agnostic core logic for the Tremolo gesture sequencer
//!
//! This crate contains the application logic that does not depend on a
//! specific chip:
//!
//! - Sequencer configuration and validation
//! - Step and sequence definitions
//! - The poll-driven sequence engine and its interrupt-safe playback state
//! - Named sequence programs
//! - A blocking "run to completion" helper for single-shot scripts
//!
//! All hardware access goes through the traits in `tremolo-hal`.

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to later modules
#[macro_use]
mod fmt;

pub mod config;
pub mod program;
pub mod runner;
pub mod sequencer;

pub use config::{ConfigError, SequencerConfig};
pub use program::SequenceKind;
pub use sequencer::{
    Bindings, Phase, PlaybackState, SequenceEngine, SequencerError, Step, StepKind,
};
