//! RP2040-specific HAL for the Tremolo firmware
//!
//! This crate provides RP2040 implementations of the shared `tremolo-hal`
//! traits:
//!
//! - PWM slice driver (implements `tremolo_hal::PwmPeripheral`)
//! - Monotonic clock backed by `embassy-time`

#![no_std]

pub mod clock;
pub mod pwm;

pub use clock::EmbassyClock;
pub use pwm::SlicePwm;

// Re-export shared traits from tremolo-hal for convenience
pub use tremolo_hal::{MonotonicClock, PwmPeripheral};
