//! Playback state shared with interrupt context
//!
//! The state lives behind a critical-section mutex and can only be reached
//! through [`SharedPlayback`]. Closures passed to it run with interrupts
//! masked: they must not allocate, log, or touch the PWM peripheral.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::step::StepKind;

/// Engine state-machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No signal driven, sequence retired
    #[default]
    Idle,
    /// Signal on, frequency alternating every toggle interval
    EmittingToggles,
    /// Signal off, waiting out the step's post-delay
    WaitingBetweenSteps,
}

/// Snapshot of the engine's playback position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackState {
    pub phase: Phase,
    /// Index of the active step (valid while not idle)
    pub step_index: usize,
    /// Toggles completed in the active step
    pub toggle_count: u8,
    /// Toggle intervals the active step runs for
    pub toggle_target: u8,
    /// Monotonic time of the last transition (ms)
    pub last_transition_ms: u64,
}

impl PlaybackState {
    /// Initial state
    pub const fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            step_index: 0,
            toggle_count: 0,
            toggle_target: 0,
            last_transition_ms: 0,
        }
    }

    /// State at the start of a step's emitting phase
    pub const fn entering_step(step_index: usize, kind: StepKind, now_ms: u64) -> Self {
        Self {
            phase: Phase::EmittingToggles,
            step_index,
            toggle_count: 0,
            toggle_target: kind.toggle_target(),
            last_transition_ms: now_ms,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}

/// Interrupt-safe holder for [`PlaybackState`]
pub struct SharedPlayback {
    inner: Mutex<CriticalSectionRawMutex, Cell<PlaybackState>>,
}

impl SharedPlayback {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(PlaybackState::idle())),
        }
    }

    /// Consistent copy of every field
    pub fn snapshot(&self) -> PlaybackState {
        self.inner.lock(|cell| cell.get())
    }

    /// Read-modify-write under one critical section
    pub fn modify<R>(&self, f: impl FnOnce(&mut PlaybackState) -> R) -> R {
        self.inner.lock(|cell| {
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    /// Replace the state only if it still equals `expected`
    ///
    /// Returns false (and leaves the state alone) when something else, such
    /// as a stop, changed it after `expected` was taken.
    pub fn compare_and_set(&self, expected: PlaybackState, next: PlaybackState) -> bool {
        self.inner.lock(|cell| {
            if cell.get() == expected {
                cell.set(next);
                true
            } else {
                false
            }
        })
    }
}

impl Default for SharedPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let shared = SharedPlayback::new();
        assert!(shared.snapshot().is_idle());
        assert_eq!(shared.snapshot(), PlaybackState::idle());
    }

    #[test]
    fn test_entering_step_targets() {
        let large = PlaybackState::entering_step(2, StepKind::Large, 500);
        assert_eq!(large.phase, Phase::EmittingToggles);
        assert_eq!(large.step_index, 2);
        assert_eq!(large.toggle_count, 0);
        assert_eq!(large.toggle_target, 4);
        assert_eq!(large.last_transition_ms, 500);

        let small = PlaybackState::entering_step(0, StepKind::Small, 0);
        assert_eq!(small.toggle_target, 2);
    }

    #[test]
    fn test_modify_returns_closure_result() {
        let shared = SharedPlayback::new();
        let was_idle = shared.modify(|s| {
            let was = s.is_idle();
            s.phase = Phase::WaitingBetweenSteps;
            was
        });
        assert!(was_idle);
        assert_eq!(shared.snapshot().phase, Phase::WaitingBetweenSteps);
    }

    #[test]
    fn test_compare_and_set() {
        let shared = SharedPlayback::new();
        let running = PlaybackState::entering_step(0, StepKind::Small, 10);
        assert!(shared.compare_and_set(PlaybackState::idle(), running));
        assert_eq!(shared.snapshot(), running);

        // Stale expectation is rejected
        let later = PlaybackState {
            toggle_count: 1,
            ..running
        };
        assert!(!shared.compare_and_set(PlaybackState::idle(), later));
        assert_eq!(shared.snapshot(), running);
    }
}
