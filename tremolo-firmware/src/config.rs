//! Build-time configuration
//!
//! Constants generated by build.rs from the validated sequencer.toml.

include!(concat!(env!("OUT_DIR"), "/sequencer_config.rs"));
