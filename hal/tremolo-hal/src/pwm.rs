//! PWM peripheral abstraction
//!
//! Models a timer/channel PWM block: timers set the frequency and duty
//! resolution, channels bind a timer to an output pin and carry the duty
//! value. Duty writes are staged and only reach the pin once committed.
//!
//! Chip HALs map these calls onto their registers; the sequencer core only
//! ever talks to this trait.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timer clock domain
///
/// Chips with a single clock domain ignore this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpeedMode {
    /// Glitch-free updates applied by hardware
    #[default]
    HighSpeed,
    /// Updates applied by software
    LowSpeed,
}

/// Duty cycle resolution in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DutyResolution(pub u8);

impl DutyResolution {
    /// Smallest supported resolution
    pub const MIN_BITS: u8 = 1;
    /// Largest supported resolution
    pub const MAX_BITS: u8 = 20;

    /// Number of resolution bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check the bit count is within the supported range
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::MIN_BITS && self.0 <= Self::MAX_BITS
    }

    /// Duty value for 100% on-time
    ///
    /// Saturates at `u32::MAX` for bit counts a `u32` cannot hold.
    pub const fn max_duty(self) -> u32 {
        match 1u32.checked_shl(self.0 as u32) {
            Some(duty) => duty,
            None => u32::MAX,
        }
    }

    /// Duty value for a 50% square wave (0 for a zero-bit resolution)
    pub const fn mid_scale(self) -> u32 {
        self.max_duty() / 2
    }
}

impl Default for DutyResolution {
    fn default() -> Self {
        Self(13)
    }
}

/// Hardware timer index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimerId(pub u8);

/// Hardware PWM channel index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelId(pub u8);

/// GPIO number of the PWM output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinId(pub u8);

/// Output level held after a channel is halted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdleLevel {
    #[default]
    Low,
    High,
}

/// Full timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    pub mode: SpeedMode,
    pub resolution: DutyResolution,
    pub timer: TimerId,
    /// Output frequency in Hz
    pub freq_hz: u32,
}

/// Full channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub pin: PinId,
    pub mode: SpeedMode,
    pub channel: ChannelId,
    /// Timer driving this channel
    pub timer: TimerId,
    /// Initial duty in resolution units
    pub duty: u32,
    /// Phase offset of the rising edge, in timer counts
    pub hpoint: u32,
}

/// Errors reported by a PWM peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Timer index does not exist on this chip
    InvalidTimer,
    /// Channel index does not exist on this chip
    InvalidChannel,
    /// Pin cannot be routed to the channel
    InvalidPin,
    /// Resolution not supported
    InvalidResolution,
    /// Frequency cannot be reached with the timer clock
    FrequencyOutOfRange,
    /// Duty exceeds the configured resolution
    DutyOutOfRange,
    /// Channel used before its timer was configured
    NotConfigured,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PwmError::InvalidTimer => "invalid timer",
            PwmError::InvalidChannel => "invalid channel",
            PwmError::InvalidPin => "invalid pin",
            PwmError::InvalidResolution => "unsupported duty resolution",
            PwmError::FrequencyOutOfRange => "frequency out of range",
            PwmError::DutyOutOfRange => "duty out of range",
            PwmError::NotConfigured => "channel not configured",
        };
        f.write_str(msg)
    }
}

/// Timer/channel PWM generator
///
/// Every call is expected to be fast and non-blocking. Implementations
/// must not be invoked from inside a critical section by the caller.
pub trait PwmPeripheral {
    /// Reinitialize a timer from scratch
    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError>;

    /// Bind a channel to a timer and pin with an initial duty
    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), PwmError>;

    /// Change only the timer frequency, leaving duty untouched
    fn set_frequency(&mut self, mode: SpeedMode, timer: TimerId, freq_hz: u32)
    -> Result<(), PwmError>;

    /// Stage a new duty value (not visible until committed)
    fn set_duty(&mut self, mode: SpeedMode, channel: ChannelId, duty: u32) -> Result<(), PwmError>;

    /// Apply the staged duty to the output
    fn commit_duty(&mut self, mode: SpeedMode, channel: ChannelId) -> Result<(), PwmError>;

    /// Stop signal generation and hold the pin at `level`
    fn halt(&mut self, mode: SpeedMode, channel: ChannelId, level: IdleLevel)
    -> Result<(), PwmError>;
}
