//! Monotonic time source
//!
//! The sequencer measures every interval against a single monotonic
//! millisecond counter. Wall-clock time is never used, so adjusting a
//! calendar clock cannot stretch or skip a step.

/// Monotonic millisecond clock
///
/// Implementations must never go backwards. The epoch is arbitrary
/// (typically boot).
pub trait MonotonicClock {
    /// Milliseconds elapsed since the clock's epoch
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `since_ms`
    ///
    /// Saturates at zero if `since_ms` lies in the future.
    fn elapsed_since(&self, since_ms: u64) -> u64 {
        self.now_ms().saturating_sub(since_ms)
    }
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
