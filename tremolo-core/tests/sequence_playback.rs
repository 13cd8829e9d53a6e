//! Playback invariants over arbitrary sequences

mod common;

use common::{Call, Recorder, TestClock};
use proptest::prelude::*;
use tremolo_core::{Bindings, SequenceEngine, SequencerConfig, Step, StepKind};
use tremolo_hal::{ChannelId, DutyResolution, MonotonicClock, PinId, SpeedMode, TimerId};

const PRIMARY: u32 = 270;
const SECONDARY: u32 = 400;
const MID_SCALE: u32 = 4096;

fn config(toggle_interval_ms: u32) -> SequencerConfig {
    SequencerConfig {
        speed_mode: SpeedMode::HighSpeed,
        duty_resolution: DutyResolution(13),
        primary_freq_hz: PRIMARY,
        secondary_freq_hz: SECONDARY,
        toggle_interval_ms,
    }
}

fn bindings() -> Bindings {
    Bindings {
        pin: PinId(16),
        timer: TimerId(0),
        channel: ChannelId(0),
    }
}

/// Poll every `tick_ms` until idle; returns the finish time
fn play(
    engine: &mut SequenceEngine<Recorder, &TestClock>,
    clock: &TestClock,
    tick_ms: u64,
) -> u64 {
    for _ in 0..1_000_000 {
        if engine.is_finished() {
            return clock.now_ms();
        }
        clock.advance(tick_ms);
        engine.update().unwrap();
    }
    panic!("sequence never finished");
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (any::<bool>(), 0u32..1500).prop_map(|(large, delay)| {
        if large {
            Step::large(delay)
        } else {
            Step::small(delay)
        }
    })
}

/// Split the call log at each cold configuration
fn segments(calls: &[Call]) -> Vec<&[Call]> {
    let starts: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Timer(_)))
        .map(|(i, _)| i)
        .collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(calls.len());
            &calls[start..end]
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_every_step_toggles_then_goes_silent(
        steps in prop::collection::vec(step_strategy(), 1..8),
        interval in 1u32..400,
        tick in 1u64..25,
    ) {
        let clock = TestClock::default();
        let mut engine: SequenceEngine<Recorder, &TestClock> =
            SequenceEngine::new(Recorder::default(), &clock, bindings(), config(interval)).unwrap();

        engine.begin(&steps).unwrap();
        prop_assert!(!engine.is_finished());
        play(&mut engine, &clock, tick);

        let calls = &engine.peripheral().calls;
        let segs = segments(calls);
        prop_assert_eq!(segs.len(), steps.len());

        for (i, (seg, step)) in segs.iter().zip(&steps).enumerate() {
            // Cold configuration, then output enabled
            prop_assert_eq!(
                &seg[..3],
                &[Call::Timer(PRIMARY), Call::Channel(MID_SCALE), Call::Commit]
            );

            let switches: Vec<u32> = seg
                .iter()
                .filter_map(|c| match c {
                    Call::Frequency(f) => Some(*f),
                    _ => None,
                })
                .collect();
            let expected_switches = usize::from(step.kind.toggle_target()) - 1;
            prop_assert_eq!(switches.len(), expected_switches);
            for (n, freq) in switches.iter().enumerate() {
                let want = if n % 2 == 0 { SECONDARY } else { PRIMARY };
                prop_assert_eq!(*freq, want);
            }

            let off_at = 3 + expected_switches;
            prop_assert_eq!(&seg[off_at..off_at + 2], &[Call::Duty(0), Call::Commit]);

            let is_last = i + 1 == steps.len();
            let tail = &seg[off_at + 2..];
            if is_last {
                prop_assert_eq!(tail, &[Call::Halt]);
            } else {
                prop_assert!(tail.is_empty());
            }
        }
    }

    #[test]
    fn prop_finishes_no_earlier_than_nominal(
        steps in prop::collection::vec(step_strategy(), 1..8),
        interval in 1u32..400,
        tick in 1u64..25,
    ) {
        let clock = TestClock::default();
        let mut engine: SequenceEngine<Recorder, &TestClock> =
            SequenceEngine::new(Recorder::default(), &clock, bindings(), config(interval)).unwrap();

        engine.begin(&steps).unwrap();
        let finished_at = play(&mut engine, &clock, tick);

        let nominal: u64 = steps.iter().map(|s| s.duration_ms(interval)).sum();
        // Each transition fires on the first poll past its deadline
        let transitions: u64 = steps
            .iter()
            .map(|s| u64::from(s.kind.toggle_target()) + 1)
            .sum();
        prop_assert!(finished_at >= nominal);
        prop_assert!(finished_at <= nominal + transitions * tick);
    }
}

#[test]
fn finished_only_after_last_post_delay() {
    let clock = TestClock::default();
    let mut engine: SequenceEngine<Recorder, &TestClock> =
        SequenceEngine::new(Recorder::default(), &clock, bindings(), config(300)).unwrap();

    engine.begin(&[Step::small(1000)]).unwrap();

    // Two intervals of signal, then 1000 ms of silence
    for _ in 0..2 {
        clock.advance(300);
        engine.update().unwrap();
        assert!(!engine.is_finished());
    }
    clock.advance(999);
    engine.update().unwrap();
    assert!(!engine.is_finished());

    clock.advance(1);
    engine.update().unwrap();
    assert!(engine.is_finished());
    assert_eq!(engine.peripheral().calls.last(), Some(&Call::Halt));
}

#[test]
fn drop_halts_running_output() {
    let clock = TestClock::default();
    let recorder = Recorder::default();
    let halts = recorder.halts.clone();

    let mut engine: SequenceEngine<Recorder, &TestClock> =
        SequenceEngine::new(recorder, &clock, bindings(), config(300)).unwrap();
    engine.begin(&[Step::large(0)]).unwrap();
    assert_eq!(engine.status().toggle_target, StepKind::Large.toggle_target());
    assert_eq!(halts.get(), 0);

    drop(engine);
    assert_eq!(halts.get(), 1);
}

#[test]
fn drop_of_idle_engine_does_not_halt() {
    let clock = TestClock::default();
    let recorder = Recorder::default();
    let halts = recorder.halts.clone();

    let engine: SequenceEngine<Recorder, &TestClock> =
        SequenceEngine::new(recorder, &clock, bindings(), config(300)).unwrap();
    drop(engine);
    assert_eq!(halts.get(), 0);
}
