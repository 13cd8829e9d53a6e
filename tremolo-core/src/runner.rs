//! Blocking sequence runner
//!
//! Composes `begin()` with a delay-paced polling loop for callers that have
//! nothing else to do while a sequence plays, such as a setup script run
//! once at boot.

use embedded_hal::delay::DelayNs;
use tremolo_hal::{MonotonicClock, PwmPeripheral};

use crate::program::SequenceKind;
use crate::sequencer::{SequenceEngine, SequencerError, Step};

/// Default time between polls (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 20;

/// Play `steps` and return once the engine is idle again
///
/// On a peripheral error the output is halted before the error is returned.
pub fn run_to_completion<P, C, D, const N: usize>(
    engine: &mut SequenceEngine<P, C, N>,
    steps: &[Step],
    delay: &mut D,
    poll_interval_ms: u32,
) -> Result<(), SequencerError>
where
    P: PwmPeripheral,
    C: MonotonicClock,
    D: DelayNs,
{
    engine.begin(steps)?;

    while !engine.is_finished() {
        if let Err(e) = engine.update() {
            error!("Sequence aborted: {}", e);
            if let Err(halt_err) = engine.stop() {
                warn!("Failed to halt output: {}", halt_err);
            }
            return Err(e);
        }
        delay.delay_ms(poll_interval_ms);
    }
    Ok(())
}

/// Play a named program to completion
pub fn run_named<P, C, D, const N: usize>(
    engine: &mut SequenceEngine<P, C, N>,
    kind: SequenceKind,
    delay: &mut D,
    poll_interval_ms: u32,
) -> Result<(), SequencerError>
where
    P: PwmPeripheral,
    C: MonotonicClock,
    D: DelayNs,
{
    info!("Executing {} sequence", kind.name());
    run_to_completion(engine, kind.steps(), delay, poll_interval_ms)?;
    info!("Sequence finished");
    Ok(())
}
