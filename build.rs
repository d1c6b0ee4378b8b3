//! Build script for the AVR timer HAL
//!
//! Handles:
//! - CPU clock selection (`AVR_F_CPU`, defaults to 16 MHz)

use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_F_CPU: u32 = 16_000_000;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=AVR_F_CPU");

    let f_cpu = match env::var("AVR_F_CPU") {
        Ok(raw) => raw
            .trim()
            .trim_end_matches("UL")
            .replace('_', "")
            .parse::<u32>()
            .unwrap_or_else(|_| panic!("AVR_F_CPU must be a frequency in Hz, got {raw:?}")),
        Err(_) => DEFAULT_F_CPU,
    };

    assert!(
        f_cpu >= 1_000,
        "AVR_F_CPU must be at least 1 kHz for the tick calculation, got {f_cpu}"
    );

    let out = PathBuf::from(env::var("OUT_DIR").unwrap()).join("clock.rs");
    fs::write(
        &out,
        format!("/// System clock frequency feeding the timer prescalers\npub const SYSTEM_CLOCK_HZ: u32 = {f_cpu};\n"),
    )
    .unwrap();
}
