//! Sequence engine
//!
//! Drives one PWM output through a list of steps. Every call returns
//! promptly: `update()` compares the monotonic clock against the last
//! transition and either acts or defers to the next poll.
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = SequenceEngine::new(pwm, clock, bindings, config)?;
//! engine.begin(&[Step::large(2000), Step::small(0)])?;
//!
//! while !engine.is_finished() {
//!     engine.update()?;
//!     delay.delay_ms(20);
//! }
//! ```
//!
//! # Peripheral discipline
//!
//! Each step starts from a full timer and channel configuration rather than
//! a frequency change, so no hardware state from the previous step can
//! distort its first pulse. PWM calls and logging always happen outside the
//! playback critical section.

use core::fmt;

use heapless::Vec;
use tremolo_hal::{
    ChannelConfig, ChannelId, IdleLevel, MonotonicClock, PinId, PwmError, PwmPeripheral,
    TimerConfig, TimerId,
};

use super::state::{Phase, PlaybackState, SharedPlayback};
use super::step::Step;
use crate::config::{ConfigError, SequencerConfig};

/// Default maximum steps per sequence
pub const DEFAULT_CAPACITY: usize = 16;

/// Hardware resources driven by one engine
///
/// Deliberately not `Clone`: a set of bindings belongs to exactly one engine.
#[derive(Debug)]
pub struct Bindings {
    /// Output GPIO
    pub pin: PinId,
    pub timer: TimerId,
    pub channel: ChannelId,
}

/// Sequencer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerError {
    /// `begin()` was given no steps
    EmptySequence,
    /// `begin()` was given more steps than the engine can hold
    SequenceTooLong,
    /// Invalid configuration
    Config(ConfigError),
    /// PWM peripheral rejected a call
    Peripheral(PwmError),
}

impl From<ConfigError> for SequencerError {
    fn from(err: ConfigError) -> Self {
        SequencerError::Config(err)
    }
}

impl From<PwmError> for SequencerError {
    fn from(err: PwmError) -> Self {
        SequencerError::Peripheral(err)
    }
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerError::EmptySequence => f.write_str("sequence is empty"),
            SequencerError::SequenceTooLong => f.write_str("sequence exceeds capacity"),
            SequencerError::Config(err) => write!(f, "config: {}", err),
            SequencerError::Peripheral(err) => write!(f, "pwm: {}", err),
        }
    }
}

/// Poll-driven PWM sequence engine
///
/// `N` is the maximum number of steps a sequence may hold. The engine owns
/// its peripheral and bindings and cannot be cloned; dropping it halts the
/// output.
pub struct SequenceEngine<P, C, const N: usize = DEFAULT_CAPACITY>
where
    P: PwmPeripheral,
    C: MonotonicClock,
{
    peripheral: P,
    clock: C,
    bindings: Bindings,
    config: SequencerConfig,
    /// Active sequence, replaced only by `begin()`
    steps: Vec<Step, N>,
    playback: SharedPlayback,
}

impl<P, C, const N: usize> SequenceEngine<P, C, N>
where
    P: PwmPeripheral,
    C: MonotonicClock,
{
    /// Create an idle engine
    ///
    /// No hardware is touched until `begin()`.
    pub fn new(
        peripheral: P,
        clock: C,
        bindings: Bindings,
        config: SequencerConfig,
    ) -> Result<Self, SequencerError> {
        config.validate()?;
        Ok(Self {
            peripheral,
            clock,
            bindings,
            config,
            steps: Vec::new(),
            playback: SharedPlayback::new(),
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    /// Steps of the most recently started sequence
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Consistent copy of the playback state
    pub fn status(&self) -> PlaybackState {
        self.playback.snapshot()
    }

    /// True when no sequence is playing
    pub fn is_finished(&self) -> bool {
        self.playback.snapshot().is_idle()
    }

    /// Start playing `steps` from the first step
    ///
    /// Output starts before this returns. An empty or over-long sequence is
    /// rejected without touching the hardware or the current playback. If the
    /// peripheral fails while starting, the engine is left idle with the
    /// output halted.
    pub fn begin(&mut self, steps: &[Step]) -> Result<(), SequencerError> {
        let Some(first) = steps.first().copied() else {
            warn!("begin() called with an empty sequence");
            return Err(SequencerError::EmptySequence);
        };
        let installed = Vec::<Step, N>::from_slice(steps).map_err(|_| {
            warn!("begin() sequence of {} steps exceeds capacity {}", steps.len(), N);
            SequencerError::SequenceTooLong
        })?;

        if let Err(e) = self.start_output() {
            self.abort_start();
            return Err(e.into());
        }

        info!("Starting sequence. Total steps: {}", installed.len());
        self.steps = installed;
        let now = self.clock.now_ms();
        self.playback
            .modify(|state| *state = PlaybackState::entering_step(0, first.kind, now));
        info!("Step 1: Running {}", first.kind.label());
        Ok(())
    }

    /// Advance the sequence if a deadline has passed
    ///
    /// Call from a polling loop every 10-20 ms. Never blocks.
    pub fn update(&mut self) -> Result<(), SequencerError> {
        let snapshot = self.playback.snapshot();

        match snapshot.phase {
            Phase::Idle => Ok(()),
            Phase::EmittingToggles => self.advance_toggle(snapshot),
            Phase::WaitingBetweenSteps => self.advance_step(snapshot),
        }
    }

    /// Stop playback and halt the output
    ///
    /// Does nothing if already idle.
    pub fn stop(&mut self) -> Result<(), SequencerError> {
        let was_running = self.playback.modify(|state| {
            let was_running = !state.is_idle();
            state.phase = Phase::Idle;
            was_running
        });

        if was_running {
            info!("Sequence stopped");
            self.peripheral
                .halt(self.config.speed_mode, self.bindings.channel, IdleLevel::Low)?;
        }
        Ok(())
    }

    /// Cold configuration followed by a duty commit, so the signal is live
    fn start_output(&mut self) -> Result<(), PwmError> {
        self.cold_configure()?;
        self.peripheral
            .commit_duty(self.config.speed_mode, self.bindings.channel)
    }

    /// Leave the engine idle with the output halted after a failed start
    ///
    /// The peripheral may be half configured, so the halt is issued even if
    /// nothing was playing.
    fn abort_start(&mut self) {
        self.playback.modify(|state| state.phase = Phase::Idle);
        if let Err(e) = self.peripheral.halt(
            self.config.speed_mode,
            self.bindings.channel,
            IdleLevel::Low,
        ) {
            warn!("Failed to halt output after aborted start: {}", e);
        }
    }

    /// Full timer + channel configuration at the primary frequency and
    /// mid-scale duty
    fn cold_configure(&mut self) -> Result<(), PwmError> {
        debug!(
            "Configuring timer {} / channel {} for new cycle",
            self.bindings.timer.0,
            self.bindings.channel.0
        );
        self.peripheral.configure_timer(&TimerConfig {
            mode: self.config.speed_mode,
            resolution: self.config.duty_resolution,
            timer: self.bindings.timer,
            freq_hz: self.config.primary_freq_hz,
        })?;
        self.peripheral.configure_channel(&ChannelConfig {
            pin: self.bindings.pin,
            mode: self.config.speed_mode,
            channel: self.bindings.channel,
            timer: self.bindings.timer,
            duty: self.config.mid_scale_duty(),
            hpoint: 0,
        })
    }

    fn advance_toggle(&mut self, snapshot: PlaybackState) -> Result<(), SequencerError> {
        let elapsed = self.clock.elapsed_since(snapshot.last_transition_ms);
        if elapsed < u64::from(self.config.toggle_interval_ms) {
            return Ok(());
        }
        let now = snapshot.last_transition_ms + elapsed;

        let mode = self.config.speed_mode;
        let next_count = snapshot.toggle_count + 1;

        if next_count >= snapshot.toggle_target {
            // Step's on-portion done
            self.peripheral.set_duty(mode, self.bindings.channel, 0)?;
            self.peripheral.commit_duty(mode, self.bindings.channel)?;
            debug!(
                "Step {} signal off, waiting {} ms",
                snapshot.step_index + 1,
                self.steps[snapshot.step_index].post_delay_ms
            );

            self.playback.compare_and_set(
                snapshot,
                PlaybackState {
                    phase: Phase::WaitingBetweenSteps,
                    last_transition_ms: now,
                    ..snapshot
                },
            );
        } else {
            let freq = self.config.toggle_frequency(next_count);
            self.peripheral
                .set_frequency(mode, self.bindings.timer, freq)?;
            debug!("Freq set to {} Hz", freq);

            self.playback.compare_and_set(
                snapshot,
                PlaybackState {
                    toggle_count: next_count,
                    last_transition_ms: now,
                    ..snapshot
                },
            );
        }
        Ok(())
    }

    fn advance_step(&mut self, snapshot: PlaybackState) -> Result<(), SequencerError> {
        let elapsed = self.clock.elapsed_since(snapshot.last_transition_ms);
        let post_delay = u64::from(self.steps[snapshot.step_index].post_delay_ms);
        if elapsed < post_delay {
            return Ok(());
        }
        let now = snapshot.last_transition_ms + elapsed;

        let next_index = snapshot.step_index + 1;
        let Some(next) = self.steps.get(next_index).copied() else {
            return self.stop();
        };

        self.start_output()?;
        info!("Step {}: Running {}", next_index + 1, next.kind.label());

        self.playback.compare_and_set(
            snapshot,
            PlaybackState::entering_step(next_index, next.kind, now),
        );
        Ok(())
    }
}

impl<P, C, const N: usize> Drop for SequenceEngine<P, C, N>
where
    P: PwmPeripheral,
    C: MonotonicClock,
{
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to halt output on drop: {}", e);
        }
    }
}
