//! Build script for tremolo-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sequencer.toml at compile time
//! - Emits the validated values as constants for the firmware

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Programs known to tremolo-core's `SequenceKind`
const KNOWN_PROGRAMS: &[&str] = &["full-setup"];

/// Slowest and fastest frequencies a PWM slice can produce at 125 MHz
const MIN_FREQ_HZ: i64 = 8;
const MAX_FREQ_HZ: i64 = 62_500_000;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values extracted from sequencer.toml
struct SequencerToml {
    pin: i64,
    poll_interval_ms: i64,
    primary_hz: i64,
    secondary_hz: i64,
    toggle_interval_ms: i64,
    duty_resolution_bits: i64,
    program: String,
}

/// Validate sequencer.toml configuration at compile time
fn validate_config() -> SequencerToml {
    println!("cargo:rerun-if-changed=sequencer.toml");

    let config_path = Path::new("sequencer.toml");
    if !config_path.exists() {
        fail(&["sequencer.toml not found next to Cargo.toml".to_string()]);
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(&[format!("Failed to read sequencer.toml: {}", e)]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(&e.to_string().lines().map(String::from).collect::<Vec<_>>()),
    };

    let mut errors = Vec::new();

    let pin = integer(&config, "output", "pin", &mut errors);
    let poll_interval_ms = integer(&config, "output", "poll_interval_ms", &mut errors);
    let primary_hz = integer(&config, "sequencer", "primary_hz", &mut errors);
    let secondary_hz = integer(&config, "sequencer", "secondary_hz", &mut errors);
    let toggle_interval_ms = integer(&config, "sequencer", "toggle_interval_ms", &mut errors);
    let duty_resolution_bits = integer(&config, "sequencer", "duty_resolution_bits", &mut errors);

    let program = match config.get("run").and_then(|r| r.get("program")) {
        Some(toml::Value::String(name)) => name.clone(),
        Some(_) => {
            errors.push("[run] program must be a string".to_string());
            String::new()
        }
        None => {
            errors.push("[run] missing 'program'".to_string());
            String::new()
        }
    };

    // Range checks
    if !(0..=29).contains(&pin) || pin % 2 != 0 {
        errors.push("[output] pin must be an even GPIO 0-28 (PWM output A)".to_string());
    }
    if poll_interval_ms <= 0 {
        errors.push("[output] poll_interval_ms must be positive".to_string());
    }
    for (name, hz) in [("primary_hz", primary_hz), ("secondary_hz", secondary_hz)] {
        if !(MIN_FREQ_HZ..=MAX_FREQ_HZ).contains(&hz) {
            errors.push(format!(
                "[sequencer] {} must be {}-{}",
                name, MIN_FREQ_HZ, MAX_FREQ_HZ
            ));
        }
    }
    if toggle_interval_ms <= 0 || toggle_interval_ms > u32::MAX as i64 {
        errors.push("[sequencer] toggle_interval_ms must be positive".to_string());
    }
    if !(1..=16).contains(&duty_resolution_bits) {
        errors.push("[sequencer] duty_resolution_bits must be 1-16".to_string());
    }
    if !program.is_empty() && !KNOWN_PROGRAMS.contains(&program.as_str()) {
        errors.push(format!(
            "[run] unknown program '{}' (known: {})",
            program,
            KNOWN_PROGRAMS.join(", ")
        ));
    }

    if !errors.is_empty() {
        fail(&errors);
    }

    if poll_interval_ms > toggle_interval_ms {
        println!(
            "cargo:warning=poll_interval_ms ({}) exceeds toggle_interval_ms ({}); toggles will lag",
            poll_interval_ms, toggle_interval_ms
        );
    }

    println!("cargo:warning=sequencer.toml validated successfully");

    SequencerToml {
        pin,
        poll_interval_ms,
        primary_hz,
        secondary_hz,
        toggle_interval_ms,
        duty_resolution_bits,
        program,
    }
}

/// Read `[section] key` as an integer, recording an error if absent
fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) => *value,
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

/// Write the validated values as Rust constants into OUT_DIR
fn generate_constants(config: &SequencerToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("sequencer_config.rs")).unwrap();

    writeln!(f, "// Generated from sequencer.toml by build.rs").unwrap();
    writeln!(f, "pub const OUTPUT_PIN: u8 = {};", config.pin).unwrap();
    writeln!(f, "pub const POLL_INTERVAL_MS: u32 = {};", config.poll_interval_ms).unwrap();
    writeln!(f, "pub const PRIMARY_HZ: u32 = {};", config.primary_hz).unwrap();
    writeln!(f, "pub const SECONDARY_HZ: u32 = {};", config.secondary_hz).unwrap();
    writeln!(f, "pub const TOGGLE_INTERVAL_MS: u32 = {};", config.toggle_interval_ms).unwrap();
    writeln!(
        f,
        "pub const DUTY_RESOLUTION_BITS: u8 = {};",
        config.duty_resolution_bits
    )
    .unwrap();
    writeln!(f, "pub const PROGRAM: &str = {:?};", config.program).unwrap();
}

/// Abort the build with a boxed error listing
fn fail(errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid sequencer.toml                                   ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
