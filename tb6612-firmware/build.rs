//! Build script for tb6612-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates motor.toml and turns it into `board.rs` in OUT_DIR

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tb6612_core::config::{ChannelSection, DriverConfig};

fn main() {
    setup_linker();
    let config = load_config();
    write_board(&config);
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate motor.toml
fn load_config() -> DriverConfig {
    println!("cargo:rerun-if-changed=motor.toml");

    let config_path = Path::new("motor.toml");

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read motor.toml", &[e.to_string()]),
    };

    let config: DriverConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid motor.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    if let Err(e) = config.validate() {
        fail("Invalid motor.toml", &[format!("{:?}", e)]);
    }

    // The firmware drives both channels and owns STBY
    let mut errors = Vec::new();
    if config.standby.is_none() {
        errors.push("missing 'standby' pin".to_string());
    }
    if config.channel_a.is_none() {
        errors.push("missing [channel_a] section".to_string());
    }
    if config.channel_b.is_none() {
        errors.push("missing [channel_b] section".to_string());
    }
    if let (Some(a), Some(b)) = (config.channel_a, config.channel_b) {
        if pwm_slice(a.pins.pwm) == pwm_slice(b.pins.pwm) {
            errors.push(format!(
                "PWM pins {} and {} share slice {}",
                a.pins.pwm,
                b.pins.pwm,
                pwm_slice(a.pins.pwm)
            ));
        }
    }
    if !errors.is_empty() {
        fail("Unsupported motor.toml", &errors);
    }

    println!("cargo:warning=motor.toml validated successfully");
    config
}

/// Write constants and pin-taking macros for the board
fn write_board(config: &DriverConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut out = String::from("// Generated by build.rs from motor.toml\n\n");

    // Presence checked by load_config
    let standby = config.standby.unwrap();
    let channel_a = config.channel_a.unwrap();
    let channel_b = config.channel_b.unwrap();

    out.push_str(&format!(
        "/// STBY GPIO\npub const STANDBY_PIN: u8 = {};\n\n",
        standby
    ));
    out.push_str(&format!(
        "macro_rules! standby_pin {{\n    ($p:expr) => {{ tb6612_hal_rp2040::take_pin!($p, {}) }};\n}}\n\n",
        standby
    ));
    out.push_str(&section_code("a", &channel_a));
    out.push_str(&section_code("b", &channel_b));

    fs::write(out_dir.join("board.rs"), out).unwrap();
}

/// Constant and hardware macro for one channel
fn section_code(name: &str, section: &ChannelSection) -> String {
    let pins = section.pins;
    let config = section.config;
    let output = if pins.pwm % 2 == 0 { "a" } else { "b" };

    format!(
        "/// Channel {upper} from motor.toml\n\
         pub const CHANNEL_{upper}: tb6612_core::config::ChannelSection = tb6612_core::config::ChannelSection {{\n    \
             pins: tb6612_core::config::ChannelPins::new({pin_a}, {pin_b}, {pwm}),\n    \
             config: tb6612_core::config::ChannelConfig {{\n        \
                 reversed: {reversed},\n        \
                 pwm_frequency_hz: {freq},\n        \
                 step_delay_ms: {step},\n    \
             }},\n\
         }};\n\n\
         macro_rules! channel_{name}_hardware {{\n    \
             ($p:expr) => {{\n        \
                 (\n            \
                     tb6612_hal_rp2040::take_pin!($p, {pin_a}),\n            \
                     tb6612_hal_rp2040::take_pin!($p, {pin_b}),\n            \
                     embassy_rp::pwm::Pwm::new_output_{output}($p.PWM_SLICE{slice}, $p.PIN_{pwm}, embassy_rp::pwm::Config::default()),\n            \
                     tb6612_hal_rp2040::SliceChannel::{output_upper},\n        \
                 )\n    \
             }};\n\
         }}\n\n",
        upper = name.to_uppercase(),
        name = name,
        pin_a = pins.pin_a,
        pin_b = pins.pin_b,
        pwm = pins.pwm,
        reversed = config.reversed,
        freq = config.pwm_frequency_hz,
        step = config.step_delay_ms,
        output = output,
        output_upper = output.to_uppercase(),
        slice = pwm_slice(pins.pwm),
    )
}

/// PWM slice of a GPIO
fn pwm_slice(gpio: u8) -> u8 {
    (gpio >> 1) & 0x7
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| format!("║  • {:<62} ║", line))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
