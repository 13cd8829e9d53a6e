//! Sequence controller
//!
//! Builds a sequence engine on the configured PWM output and plays one
//! program to completion.

use defmt::*;
use embassy_rp::pwm::Pwm;
use embassy_time::Delay;

use tremolo_core::runner::run_named;
use tremolo_core::{Bindings, SequenceEngine, SequenceKind, SequencerConfig};
use tremolo_hal::{ChannelId, DutyResolution, PinId, SpeedMode, TimerId};
use tremolo_hal_rp2040::{EmbassyClock, SlicePwm};

use crate::config::{
    DUTY_RESOLUTION_BITS, OUTPUT_PIN, POLL_INTERVAL_MS, PRIMARY_HZ, SECONDARY_HZ,
    TOGGLE_INTERVAL_MS,
};

/// Sequencer configuration from sequencer.toml
pub fn sequencer_config() -> SequencerConfig {
    SequencerConfig {
        speed_mode: SpeedMode::HighSpeed,
        duty_resolution: DutyResolution(DUTY_RESOLUTION_BITS),
        primary_freq_hz: PRIMARY_HZ,
        secondary_freq_hz: SECONDARY_HZ,
        toggle_interval_ms: TOGGLE_INTERVAL_MS,
    }
}

/// Play `kind` on the output and return when it is done
///
/// Blocks the executor for the length of the program; nothing else runs
/// until the sequence finishes. PWM failures are fatal.
pub fn run_sequence(kind: SequenceKind, pwm: Pwm<'static>) {
    let slice = (OUTPUT_PIN / 2) % 8;
    let bindings = Bindings {
        pin: PinId(OUTPUT_PIN),
        timer: TimerId(slice),
        channel: ChannelId(0),
    };
    let config = sequencer_config();

    info!(
        "Sequencer: {}/{} Hz, toggle every {} ms, slice {}",
        config.primary_freq_hz, config.secondary_freq_hz, config.toggle_interval_ms, slice
    );
    debug!(
        "Program {} nominal duration {} ms",
        kind.name(),
        kind.nominal_duration_ms(&config)
    );

    let driver = SlicePwm::new(pwm, slice, OUTPUT_PIN);
    let mut engine: SequenceEngine<SlicePwm<'static>, EmbassyClock> =
        unwrap!(SequenceEngine::new(driver, EmbassyClock, bindings, config));

    unwrap!(run_named(&mut engine, kind, &mut Delay, POLL_INTERVAL_MS));
}
