//! Build script for ember-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates board_config.rs with the board constants and pin hookup

use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Most heater channels one controller drives
const MAX_CHANNELS: usize = 4;

/// GPIOs with a fixed function on the board
const RESERVED_PINS: [u8; 10] = [0, 1, 4, 5, 23, 24, 26, 27, 28, 29];

/// Number of RP2040 GPIOs
const GPIO_COUNT: u8 = 30;

fn main() {
    setup_linker();
    let board = validate_config();
    generate_config(&board);
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

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// A pin reference like `!^gpio12`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PinSpec {
    number: u8,
    inverted: bool,
    pull_up: bool,
}

/// One heater channel
struct ChannelSpec {
    heater: PinSpec,
    stand: PinSpec,
    gain: f64,
}

/// Validated board description
struct Board {
    zero_cross: PinSpec,
    period: i64,
    recovery_us: i64,
    vref: f64,
    heartbeat: PinSpec,
    pulse_us: i64,
    eeprom_frequency: i64,
    baud: i64,
    channels: Vec<ChannelSpec>,
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml describing the channels,    ║\n\
            ║  pins and EEPROM. Please create one in ember-firmware/.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let board = read_board(&config, &mut errors);
    check_pin_usage(&board, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board.toml                                       ║\n\
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

    println!("cargo:warning=board.toml validated successfully");
    board
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a pin string
///
/// - "gpio11" -> GPIO 11
/// - "!gpio12" -> GPIO 12, inverted
/// - "^gpio4" -> GPIO 4 with pull-up
fn parse_pin(s: &str) -> Option<PinSpec> {
    let mut s = s.trim();
    let mut inverted = false;
    let mut pull_up = false;

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number: u8 = s.strip_prefix("gpio")?.parse().ok()?;
    if number >= GPIO_COUNT {
        return None;
    }

    Some(PinSpec {
        number,
        inverted,
        pull_up,
    })
}

fn section<'a>(config: &'a toml::Value, name: &str, errors: &mut Vec<String>) -> Option<&'a toml::Value> {
    match config.get(name) {
        Some(value @ toml::Value::Table(_)) => Some(value),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => {
            errors.push(format!("Missing [{}] section", name));
            None
        }
    }
}

fn pin_field(table: Option<&toml::Value>, what: &str, key: &str, errors: &mut Vec<String>) -> PinSpec {
    let fallback = PinSpec {
        number: 0,
        inverted: false,
        pull_up: false,
    };
    let Some(table) = table else {
        return fallback;
    };
    match table.get(key) {
        Some(toml::Value::String(s)) => parse_pin(s).unwrap_or_else(|| {
            errors.push(format!("{} {} '{}' is not a valid pin", what, key, s));
            fallback
        }),
        Some(_) => {
            errors.push(format!("{} {} must be a string", what, key));
            fallback
        }
        None => {
            errors.push(format!("{} missing '{}'", what, key));
            fallback
        }
    }
}

fn int_field(
    table: Option<&toml::Value>,
    what: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> i64 {
    let Some(table) = table else {
        return *range.start();
    };
    match table.get(key) {
        Some(toml::Value::Integer(v)) if range.contains(v) => *v,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "{} {} must be {}-{}",
                what,
                key,
                range.start(),
                range.end()
            ));
            *range.start()
        }
        Some(_) => {
            errors.push(format!("{} {} must be an integer", what, key));
            *range.start()
        }
        None => {
            errors.push(format!("{} missing '{}'", what, key));
            *range.start()
        }
    }
}

fn float_field(
    table: Option<&toml::Value>,
    what: &str,
    key: &str,
    range: std::ops::RangeInclusive<f64>,
    errors: &mut Vec<String>,
) -> f64 {
    let Some(table) = table else {
        return *range.start();
    };
    let value = match table.get(key) {
        Some(toml::Value::Float(v)) => *v,
        Some(toml::Value::Integer(v)) => *v as f64,
        Some(_) => {
            errors.push(format!("{} {} must be a number", what, key));
            return *range.start();
        }
        None => {
            errors.push(format!("{} missing '{}'", what, key));
            return *range.start();
        }
    };
    if !range.contains(&value) {
        errors.push(format!(
            "{} {} must be {}-{}",
            what,
            key,
            range.start(),
            range.end()
        ));
    }
    value
}

fn read_board(config: &toml::Value, errors: &mut Vec<String>) -> Board {
    let zero_cross = section(config, "zero_cross", errors);
    let amplifier = section(config, "amplifier", errors);
    let heartbeat = section(config, "heartbeat", errors);
    let eeprom = section(config, "eeprom", errors);
    let console = section(config, "console", errors);

    let mut channels = Vec::new();
    match config.get("channel") {
        Some(toml::Value::Array(list)) => {
            if list.is_empty() || list.len() > MAX_CHANNELS {
                errors.push(format!("[[channel]] count must be 1-{}", MAX_CHANNELS));
            }
            for (i, channel) in list.iter().enumerate() {
                let what = format!("[[channel]] {}", i);
                if !channel.is_table() {
                    errors.push(format!("{} must be a table", what));
                    continue;
                }
                channels.push(ChannelSpec {
                    heater: pin_field(Some(channel), &what, "heater", errors),
                    stand: pin_field(Some(channel), &what, "stand", errors),
                    gain: float_field(Some(channel), &what, "gain", 1.0..=10_000.0, errors),
                });
            }
        }
        Some(_) => errors.push("[[channel]] must be an array of tables".to_string()),
        None => errors.push("Missing [[channel]] sections".to_string()),
    }

    Board {
        zero_cross: pin_field(zero_cross, "[zero_cross]", "pin", errors),
        period: int_field(zero_cross, "[zero_cross]", "period", 1..=255, errors),
        recovery_us: int_field(amplifier, "[amplifier]", "recovery_us", 0..=100_000, errors),
        vref: float_field(amplifier, "[amplifier]", "vref", 1.0..=3.6, errors),
        heartbeat: pin_field(heartbeat, "[heartbeat]", "pin", errors),
        pulse_us: int_field(heartbeat, "[heartbeat]", "pulse_us", 1..=1_000_000, errors),
        eeprom_frequency: int_field(eeprom, "[eeprom]", "frequency", 10_000..=400_000, errors),
        baud: int_field(console, "[console]", "baud", 1_200..=921_600, errors),
        channels,
    }
}

/// Every pin has one owner; only stand contacts may be shared
fn check_pin_usage(board: &Board, errors: &mut Vec<String>) {
    let mut owners: BTreeMap<u8, String> = BTreeMap::new();
    let mut claim = |pin: PinSpec, owner: String, errors: &mut Vec<String>| {
        if RESERVED_PINS.contains(&pin.number) {
            errors.push(format!("{} uses reserved gpio{}", owner, pin.number));
        }
        if let Some(previous) = owners.insert(pin.number, owner.clone()) {
            errors.push(format!("gpio{} used by {} and {}", pin.number, previous, owner));
        }
    };

    claim(board.zero_cross, "zero_cross".to_string(), errors);
    claim(board.heartbeat, "heartbeat".to_string(), errors);
    for (i, channel) in board.channels.iter().enumerate() {
        claim(channel.heater, format!("channel {} heater", i), errors);
    }

    let mut stands: Vec<PinSpec> = Vec::new();
    for (i, channel) in board.channels.iter().enumerate() {
        match stands.iter().find(|s| s.number == channel.stand.number) {
            Some(shared) if *shared != channel.stand => errors.push(format!(
                "channel {} stand gpio{} shared with different flags",
                i, channel.stand.number
            )),
            Some(_) => {}
            None => {
                stands.push(channel.stand);
                claim(channel.stand, format!("channel {} stand", i), errors);
            }
        }
    }
}

/// Write board_config.rs into OUT_DIR
fn generate_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut stands: Vec<PinSpec> = Vec::new();
    let mut stand_of_channel = Vec::new();
    for channel in &board.channels {
        let index = match stands.iter().position(|s| s.number == channel.stand.number) {
            Some(index) => index,
            None => {
                stands.push(channel.stand);
                stands.len() - 1
            }
        };
        stand_of_channel.push(index);
    }

    let list = |items: Vec<String>| items.join(", ");
    let mut out = String::new();

    writeln!(out, "// Generated from board.toml by build.rs").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "/// Heater channels on this board").unwrap();
    writeln!(out, "pub const CHANNEL_COUNT: usize = {};", board.channels.len()).unwrap();
    writeln!(out, "/// Distinct stand contacts").unwrap();
    writeln!(out, "pub const STAND_COUNT: usize = {};", stands.len()).unwrap();
    writeln!(out, "/// Amplifier gain per channel").unwrap();
    writeln!(
        out,
        "pub const GAINS: [f32; CHANNEL_COUNT] = [{}];",
        list(board.channels.iter().map(|c| format!("{:?}_f32", c.gain)).collect())
    )
    .unwrap();
    writeln!(out, "/// Heater fires on a low level").unwrap();
    writeln!(
        out,
        "pub const HEATER_INVERTED: [bool; CHANNEL_COUNT] = [{}];",
        list(board.channels.iter().map(|c| c.heater.inverted.to_string()).collect())
    )
    .unwrap();
    writeln!(out, "/// Stand contact read by each channel").unwrap();
    writeln!(
        out,
        "pub const STAND_OF_CHANNEL: [usize; CHANNEL_COUNT] = [{}];",
        list(stand_of_channel.iter().map(|i| i.to_string()).collect())
    )
    .unwrap();
    writeln!(out, "/// Stand reads resting on a high level").unwrap();
    writeln!(
        out,
        "pub const STAND_ACTIVE_HIGH: [bool; STAND_COUNT] = [{}];",
        list(stands.iter().map(|s| s.inverted.to_string()).collect())
    )
    .unwrap();
    writeln!(out, "/// Stand input pull-up").unwrap();
    writeln!(
        out,
        "pub const STAND_PULL_UP: [bool; STAND_COUNT] = [{}];",
        list(stands.iter().map(|s| s.pull_up.to_string()).collect())
    )
    .unwrap();
    writeln!(out, "/// Zero-cross input pull-up").unwrap();
    writeln!(out, "pub const ZERO_CROSS_PULL_UP: bool = {};", board.zero_cross.pull_up).unwrap();
    writeln!(out, "/// Zero-cross detector pulses low").unwrap();
    writeln!(out, "pub const ZERO_CROSS_FALLING: bool = {};", board.zero_cross.inverted).unwrap();
    writeln!(out, "/// Half-cycles per burst-fire window").unwrap();
    writeln!(out, "pub const ZERO_CROSS_PERIOD: u8 = {};", board.period).unwrap();
    writeln!(out, "/// Amplifier settling time (µs)").unwrap();
    writeln!(out, "pub const AMP_RECOVERY_US: u32 = {};", board.recovery_us).unwrap();
    writeln!(out, "/// ADC reference (V)").unwrap();
    writeln!(out, "pub const ADC_VREF: f32 = {:?}_f32;", board.vref).unwrap();
    writeln!(out, "/// Heartbeat pulse width (µs)").unwrap();
    writeln!(out, "pub const HEARTBEAT_PULSE_US: u64 = {};", board.pulse_us).unwrap();
    writeln!(out, "/// Heartbeat LED lights on a low level").unwrap();
    writeln!(out, "pub const HEARTBEAT_INVERTED: bool = {};", board.heartbeat.inverted).unwrap();
    writeln!(out, "/// EEPROM bus clock (Hz)").unwrap();
    writeln!(out, "pub const EEPROM_FREQUENCY: u32 = {};", board.eeprom_frequency).unwrap();
    writeln!(out, "/// Console baud rate").unwrap();
    writeln!(out, "pub const CONSOLE_BAUD: u32 = {};", board.baud).unwrap();
    writeln!(out).unwrap();

    let take = |pin: PinSpec| format!("ember_hal_rp2040::take_pin!(p, {})", pin.number);

    writeln!(out, "/// Split the peripherals into board pins and fixed-function peripherals").unwrap();
    writeln!(
        out,
        "pub fn split(p: embassy_rp::Peripherals) -> (BoardPins, FixedPeripherals) {{"
    )
    .unwrap();
    writeln!(out, "    let pins = BoardPins {{").unwrap();
    writeln!(
        out,
        "        heaters: [{}],",
        list(board.channels.iter().map(|c| take(c.heater)).collect())
    )
    .unwrap();
    writeln!(
        out,
        "        stands: [{}],",
        list(stands.iter().map(|s| take(*s)).collect())
    )
    .unwrap();
    writeln!(out, "        zero_cross: {},", take(board.zero_cross)).unwrap();
    writeln!(out, "        heartbeat: {},", take(board.heartbeat)).unwrap();
    writeln!(out, "    }};").unwrap();
    writeln!(out, "    let fixed = FixedPeripherals {{").unwrap();
    writeln!(out, "        uart: p.UART0,").unwrap();
    writeln!(out, "        uart_tx: p.PIN_0,").unwrap();
    writeln!(out, "        uart_rx: p.PIN_1,").unwrap();
    writeln!(out, "        i2c: p.I2C0,").unwrap();
    writeln!(out, "        i2c_sda: p.PIN_4,").unwrap();
    writeln!(out, "        i2c_scl: p.PIN_5,").unwrap();
    writeln!(out, "        adc: p.ADC,").unwrap();
    writeln!(
        out,
        "        adc_channels: [{}],",
        list(
            (0..board.channels.len())
                .map(|i| format!(
                    "embassy_rp::adc::Channel::new_pin(p.PIN_{}, embassy_rp::gpio::Pull::None)",
                    26 + i
                ))
                .collect()
        )
    )
    .unwrap();
    writeln!(out, "    }};").unwrap();
    writeln!(out, "    (pins, fixed)").unwrap();
    writeln!(out, "}}").unwrap();

    fs::write(out_dir.join("board_config.rs"), out).unwrap();
}
