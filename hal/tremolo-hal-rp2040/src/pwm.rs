//! PWM slice driver
//!
//! Maps the timer/channel model of `tremolo-hal` onto one RP2040 PWM slice.
//! The slice counter is the "timer" (its id is the slice number) and output
//! A is channel 0. The RP2040 has a single PWM clock domain, so the speed
//! mode is ignored, and slices have no phase offset, so `hpoint` is too.
//!
//! # Frequency
//!
//! The slice counts at SYS_CLK / divider and wraps after TOP + 1 counts:
//! freq = SYS_CLK / (divider * (TOP + 1))
//!
//! The smallest integer divider that keeps TOP within 16 bits is chosen, so
//! the duty resolution stays as fine as the frequency allows.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::types::extra::U4;
use fixed::FixedU16;
use tremolo_hal::{
    ChannelConfig, ChannelId, DutyResolution, IdleLevel, PwmError, PwmPeripheral, SpeedMode,
    TimerConfig, TimerId,
};

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Largest integer clock divider
const MAX_DIVIDER: u32 = 255;

/// Counter period limit (TOP + 1)
const MAX_PERIOD: u32 = 0x1_0000;

/// Calculate divider and TOP for a target frequency
///
/// Returns `None` if the frequency cannot be generated.
pub fn calc_slice_timing(freq_hz: u32) -> Option<(u8, u16)> {
    if freq_hz == 0 {
        return None;
    }

    // Total system clocks per PWM period
    let period_clocks = SYS_CLK_HZ / freq_hz;
    if period_clocks < 2 {
        return None;
    }

    let divider = period_clocks.div_ceil(MAX_PERIOD).max(1);
    if divider > MAX_DIVIDER {
        return None;
    }

    let top = period_clocks / divider - 1;
    Some((divider as u8, top as u16))
}

/// Convert a duty in resolution units to a compare value for `top`
pub fn duty_to_compare(duty: u32, resolution: DutyResolution, top: u16) -> u16 {
    let period = u64::from(top) + 1;
    let compare = (u64::from(duty) * period) >> resolution.bits();
    compare.min(0xFFFF) as u16
}

/// Which slice drives a GPIO, and whether it is output A
const fn pin_slice(pin: u8) -> (u8, bool) {
    ((pin / 2) % 8, pin % 2 == 0)
}

/// One RP2040 PWM slice driving output A
pub struct SlicePwm<'d> {
    pwm: Pwm<'d>,
    config: PwmConfig,
    /// Slice number (timer id)
    slice: u8,
    /// GPIO routed to output A
    pin: u8,
    /// Set by the last timer configuration
    resolution: Option<DutyResolution>,
    staged_duty: u32,
    active_duty: u32,
}

impl<'d> SlicePwm<'d> {
    /// Wrap a slice already bound to `pin` (e.g. via `Pwm::new_output_a`)
    ///
    /// Output stays disabled until the first timer configuration.
    pub fn new(pwm: Pwm<'d>, slice: u8, pin: u8) -> Self {
        Self {
            pwm,
            config: PwmConfig::default(),
            slice,
            pin,
            resolution: None,
            staged_duty: 0,
            active_duty: 0,
        }
    }

    fn check_timer(&self, timer: TimerId) -> Result<(), PwmError> {
        if timer.0 == self.slice {
            Ok(())
        } else {
            Err(PwmError::InvalidTimer)
        }
    }

    fn check_channel(&self, channel: ChannelId) -> Result<DutyResolution, PwmError> {
        if channel.0 != 0 {
            return Err(PwmError::InvalidChannel);
        }
        self.resolution.ok_or(PwmError::NotConfigured)
    }

    fn check_duty(resolution: DutyResolution, duty: u32) -> Result<(), PwmError> {
        if duty > resolution.max_duty() {
            Err(PwmError::DutyOutOfRange)
        } else {
            Ok(())
        }
    }

    fn apply_timing(&mut self, freq_hz: u32) -> Result<(), PwmError> {
        let (divider, top) = calc_slice_timing(freq_hz).ok_or(PwmError::FrequencyOutOfRange)?;
        self.config.divider = FixedU16::<U4>::from_num(divider);
        self.config.top = top;
        Ok(())
    }

    /// Write the active duty and timing to the slice registers
    fn write(&mut self) {
        self.config.compare_a = match self.resolution {
            Some(resolution) => duty_to_compare(self.active_duty, resolution, self.config.top),
            None => 0,
        };
        self.pwm.set_config(&self.config);
    }
}

impl PwmPeripheral for SlicePwm<'_> {
    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError> {
        self.check_timer(config.timer)?;
        if !config.resolution.is_valid() {
            return Err(PwmError::InvalidResolution);
        }

        // Start from reset values so nothing carries over between steps
        self.config = PwmConfig::default();
        self.apply_timing(config.freq_hz)?;
        self.config.enable = true;
        self.resolution = Some(config.resolution);
        self.staged_duty = 0;
        self.active_duty = 0;
        self.write();
        Ok(())
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), PwmError> {
        let resolution = self.check_channel(config.channel)?;
        self.check_timer(config.timer)?;
        if config.pin.0 != self.pin || pin_slice(config.pin.0) != (self.slice, true) {
            return Err(PwmError::InvalidPin);
        }
        Self::check_duty(resolution, config.duty)?;

        self.config.invert_a = false;
        self.staged_duty = config.duty;
        self.active_duty = config.duty;
        self.write();
        Ok(())
    }

    fn set_frequency(
        &mut self,
        _mode: SpeedMode,
        timer: TimerId,
        freq_hz: u32,
    ) -> Result<(), PwmError> {
        self.check_timer(timer)?;
        if self.resolution.is_none() {
            return Err(PwmError::NotConfigured);
        }
        self.apply_timing(freq_hz)?;
        // Compare is rescaled so the duty ratio survives the new TOP
        self.write();
        Ok(())
    }

    fn set_duty(&mut self, _mode: SpeedMode, channel: ChannelId, duty: u32) -> Result<(), PwmError> {
        let resolution = self.check_channel(channel)?;
        Self::check_duty(resolution, duty)?;
        self.staged_duty = duty;
        Ok(())
    }

    fn commit_duty(&mut self, _mode: SpeedMode, channel: ChannelId) -> Result<(), PwmError> {
        self.check_channel(channel)?;
        self.active_duty = self.staged_duty;
        self.write();
        Ok(())
    }

    fn halt(
        &mut self,
        _mode: SpeedMode,
        channel: ChannelId,
        level: IdleLevel,
    ) -> Result<(), PwmError> {
        if channel.0 != 0 {
            return Err(PwmError::InvalidChannel);
        }
        // Compare 0 holds the output low; inverting it holds it high
        self.config.invert_a = level == IdleLevel::High;
        self.staged_duty = 0;
        self.active_duty = 0;
        self.write();
        Ok(())
    }
}
