//! Test doubles for the PWM peripheral, clock and delay

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use tremolo_hal::{
    ChannelConfig, ChannelId, IdleLevel, MonotonicClock, PwmError, PwmPeripheral, SpeedMode,
    TimerConfig, TimerId,
};

/// One recorded peripheral call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmCall {
    ConfigureTimer(TimerConfig),
    ConfigureChannel(ChannelConfig),
    SetFrequency(u32),
    SetDuty(u32),
    CommitDuty,
    Halt(IdleLevel),
}

/// Peripheral that records every call
#[derive(Default)]
pub struct RecordingPwm {
    pub calls: Vec<PwmCall, 256>,
    /// Reject timer configuration with this error
    pub fail_timer: Option<PwmError>,
    /// Reject frequency changes with this error
    pub fail_frequency: Option<PwmError>,
    /// Reject duty commits with this error
    pub fail_commit: Option<PwmError>,
}

impl RecordingPwm {
    fn record(&mut self, call: PwmCall) {
        self.calls.push(call).expect("call log full");
    }

    pub fn count(&self, pred: impl Fn(&PwmCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(*c)).count()
    }
}

impl PwmPeripheral for RecordingPwm {
    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError> {
        if let Some(err) = self.fail_timer {
            return Err(err);
        }
        self.record(PwmCall::ConfigureTimer(*config));
        Ok(())
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), PwmError> {
        self.record(PwmCall::ConfigureChannel(*config));
        Ok(())
    }

    fn set_frequency(
        &mut self,
        _mode: SpeedMode,
        _timer: TimerId,
        freq_hz: u32,
    ) -> Result<(), PwmError> {
        if let Some(err) = self.fail_frequency {
            return Err(err);
        }
        self.record(PwmCall::SetFrequency(freq_hz));
        Ok(())
    }

    fn set_duty(&mut self, _mode: SpeedMode, _channel: ChannelId, duty: u32) -> Result<(), PwmError> {
        self.record(PwmCall::SetDuty(duty));
        Ok(())
    }

    fn commit_duty(&mut self, _mode: SpeedMode, _channel: ChannelId) -> Result<(), PwmError> {
        if let Some(err) = self.fail_commit {
            return Err(err);
        }
        self.record(PwmCall::CommitDuty);
        Ok(())
    }

    fn halt(
        &mut self,
        _mode: SpeedMode,
        _channel: ChannelId,
        level: IdleLevel,
    ) -> Result<(), PwmError> {
        self.record(PwmCall::Halt(level));
        Ok(())
    }
}

/// Clock advanced by hand
#[derive(Default)]
pub struct ManualClock(Cell<u64>);

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Delay that advances a [`ManualClock`] instead of sleeping
pub struct ClockDelay<'a> {
    pub clock: &'a ManualClock,
    pending_ns: u64,
}

impl<'a> ClockDelay<'a> {
    pub fn new(clock: &'a ManualClock) -> Self {
        Self {
            clock,
            pending_ns: 0,
        }
    }
}

impl DelayNs for ClockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.pending_ns += u64::from(ns);
        self.clock.advance(self.pending_ns / 1_000_000);
        self.pending_ns %= 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}
