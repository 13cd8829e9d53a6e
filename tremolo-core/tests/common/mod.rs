//! Shared fakes for integration tests

use std::cell::Cell;
use std::rc::Rc;

use tremolo_hal::{
    ChannelConfig, ChannelId, IdleLevel, MonotonicClock, PwmError, PwmPeripheral, SpeedMode,
    TimerConfig, TimerId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Timer(u32),
    Channel(u32),
    Frequency(u32),
    Duty(u32),
    Commit,
    Halt,
}

#[derive(Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
    /// Halt counter that outlives the engine
    pub halts: Rc<Cell<usize>>,
}

impl PwmPeripheral for Recorder {
    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), PwmError> {
        self.calls.push(Call::Timer(config.freq_hz));
        Ok(())
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), PwmError> {
        self.calls.push(Call::Channel(config.duty));
        Ok(())
    }

    fn set_frequency(
        &mut self,
        _mode: SpeedMode,
        _timer: TimerId,
        freq_hz: u32,
    ) -> Result<(), PwmError> {
        self.calls.push(Call::Frequency(freq_hz));
        Ok(())
    }

    fn set_duty(&mut self, _mode: SpeedMode, _channel: ChannelId, duty: u32) -> Result<(), PwmError> {
        self.calls.push(Call::Duty(duty));
        Ok(())
    }

    fn commit_duty(&mut self, _mode: SpeedMode, _channel: ChannelId) -> Result<(), PwmError> {
        self.calls.push(Call::Commit);
        Ok(())
    }

    fn halt(
        &mut self,
        _mode: SpeedMode,
        _channel: ChannelId,
        _level: IdleLevel,
    ) -> Result<(), PwmError> {
        self.calls.push(Call::Halt);
        self.halts.set(self.halts.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
pub struct TestClock(Cell<u64>);

impl TestClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl MonotonicClock for TestClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}
