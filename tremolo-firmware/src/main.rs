//! Tremolo - Scripted PWM Gesture Sequencer
//!
//! Firmware binary for RP2040 boards. Plays the configured gesture program
//! once on the PWM output at boot, then idles.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::{Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use tremolo_core::SequenceKind;

use crate::config::OUTPUT_PIN;

mod config;
mod controller;

/// Bind the configured GPIO's PWM slice, output A
macro_rules! pwm_output_a {
    ($p:ident, $($pin:literal => ($slice:ident, $gpio:ident)),+ $(,)?) => {
        match OUTPUT_PIN {
            $($pin => Pwm::new_output_a($p.$slice, $p.$gpio, PwmConfig::default()),)+
            other => defmt::panic!("GPIO {} has no PWM output A", other),
        }
    };
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Tremolo firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let pwm = pwm_output_a!(p,
        0 => (PWM_SLICE0, PIN_0),
        2 => (PWM_SLICE1, PIN_2),
        4 => (PWM_SLICE2, PIN_4),
        6 => (PWM_SLICE3, PIN_6),
        8 => (PWM_SLICE4, PIN_8),
        10 => (PWM_SLICE5, PIN_10),
        12 => (PWM_SLICE6, PIN_12),
        14 => (PWM_SLICE7, PIN_14),
        16 => (PWM_SLICE0, PIN_16),
        18 => (PWM_SLICE1, PIN_18),
        20 => (PWM_SLICE2, PIN_20),
        22 => (PWM_SLICE3, PIN_22),
        24 => (PWM_SLICE4, PIN_24),
        26 => (PWM_SLICE5, PIN_26),
        28 => (PWM_SLICE6, PIN_28),
    );

    // Name was checked against the known programs by build.rs
    let kind = unwrap!(SequenceKind::from_name(config::PROGRAM));

    info!("About to run the {} sequence on GPIO {}...", kind.name(), OUTPUT_PIN);
    controller::run_sequence(kind, pwm);
    info!("Sequence done. Entering idle loop.");

    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        ticker.next().await;
    }
}
