//! Monotonic clock backed by the embassy time driver

use embassy_time::Instant;
use tremolo_hal::MonotonicClock;

/// Milliseconds since boot, from the RP2040 timer peripheral
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
