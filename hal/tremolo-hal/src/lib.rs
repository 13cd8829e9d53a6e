//! Tremolo Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that the sequencer
//! core drives. Chip-specific HALs (RP2040, ...) implement them so the same
//! state machine runs on any board, and host tests substitute recording
//! fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (tremolo-firmware, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tremolo-core (sequence engine)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tremolo-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ tremolo-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pwm::PwmPeripheral`] - Timer/channel PWM generation
//! - [`clock::MonotonicClock`] - Millisecond time source

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod pwm;

// Re-export key traits at crate root for convenience
pub use clock::MonotonicClock;
pub use pwm::{
    ChannelConfig, ChannelId, DutyResolution, IdleLevel, PinId, PwmError, PwmPeripheral,
    SpeedMode, TimerConfig, TimerId,
};
