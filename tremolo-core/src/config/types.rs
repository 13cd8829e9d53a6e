//! Configuration type definitions

use core::fmt;

use tremolo_hal::{DutyResolution, SpeedMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default primary (resting) frequency in Hz
pub const DEFAULT_PRIMARY_FREQ_HZ: u32 = 270;

/// Default secondary (alternate) frequency in Hz
pub const DEFAULT_SECONDARY_FREQ_HZ: u32 = 400;

/// Default time between frequency toggles in ms
pub const DEFAULT_TOGGLE_INTERVAL_MS: u32 = 285;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A frequency of 0 Hz was given
    ZeroFrequency,
    /// Toggle interval of 0 ms would collapse every step into one poll
    ZeroToggleInterval,
    /// Duty resolution outside the supported bit range
    InvalidResolution,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroFrequency => "frequency must be non-zero",
            ConfigError::ZeroToggleInterval => "toggle interval must be non-zero",
            ConfigError::InvalidResolution => "unsupported duty resolution",
        };
        f.write_str(msg)
    }
}

/// Sequencer configuration
///
/// Immutable for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequencerConfig {
    /// Timer clock domain
    pub speed_mode: SpeedMode,
    /// Duty resolution used for every cold configuration
    pub duty_resolution: DutyResolution,
    /// Frequency at step entry and on even toggles (Hz)
    pub primary_freq_hz: u32,
    /// Frequency on odd toggles (Hz)
    pub secondary_freq_hz: u32,
    /// Time between toggles while a step is emitting (ms)
    pub toggle_interval_ms: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            speed_mode: SpeedMode::HighSpeed,
            duty_resolution: DutyResolution::default(),
            primary_freq_hz: DEFAULT_PRIMARY_FREQ_HZ,
            secondary_freq_hz: DEFAULT_SECONDARY_FREQ_HZ,
            toggle_interval_ms: DEFAULT_TOGGLE_INTERVAL_MS,
        }
    }
}

impl SequencerConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_freq_hz == 0 || self.secondary_freq_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.toggle_interval_ms == 0 {
            return Err(ConfigError::ZeroToggleInterval);
        }
        if !self.duty_resolution.is_valid() {
            return Err(ConfigError::InvalidResolution);
        }
        Ok(())
    }

    /// Duty applied at every cold configuration (50%)
    pub fn mid_scale_duty(&self) -> u32 {
        self.duty_resolution.mid_scale()
    }

    /// Frequency selected by the n-th toggle of a step (1-based)
    ///
    /// Odd toggles select the secondary frequency, even toggles return to
    /// the primary one.
    pub fn toggle_frequency(&self, toggle: u8) -> u32 {
        if toggle % 2 == 1 {
            self.secondary_freq_hz
        } else {
            self.primary_freq_hz
        }
    }
}
