//! Configuration types
//!
//! Board-agnostic sequencer configuration, supplied once when an engine is
//! built.

pub mod types;

pub use types::*;
