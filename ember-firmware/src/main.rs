//! Ember - Multi-channel Soldering Station Firmware
//!
//! Main firmware binary for RP2040-based soldering stations. Each channel
//! reads a thermocouple iron, runs a PID loop in calibrated thermocouple
//! voltage and fires its AC heater in whole half-cycles.
//!
//! ```text
//!  zero-cross pin ──► zero_cross_task (interrupt executor, P2)
//!                        │  fires heaters, requests samples
//!                        ▼
//!                    LINKS[n] (atomics)
//!                        │
//!                        ▼
//!  console UART ◄──► control_task (thread executor) ──► EEPROM
//! ```

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{Adc, Blocking, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ember_core::config::SensorChain;
use ember_core::scheduler::{FiringOutput, OutputStage};
use ember_core::{Channel, Station};
use ember_drivers::heater::GpioHeater;
use ember_drivers::sensor::{AdcThermocouple, GpioStand};
use ember_drivers::storage::Eeprom24x;
use ember_hal_rp2040::gpio::share;
use ember_hal_rp2040::{EmbassyClock, RpAdcInput, RpInput, RpOutput, SharedOutput, SharedPin};

use crate::board::{
    BoardStation, ADC_VREF, AMP_RECOVERY_US, CHANNEL_COUNT, CONSOLE_BAUD, EEPROM_FREQUENCY, GAINS,
    HEARTBEAT_INVERTED, HEATER_INVERTED, STAND_ACTIVE_HIGH, STAND_COUNT, STAND_OF_CHANNEL,
    STAND_PULL_UP, ZERO_CROSS_PERIOD, ZERO_CROSS_PULL_UP,
};
use crate::channels::LINKS;

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Executor for the zero-cross task, preempts the main loop
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Hardware shared between channels or between tasks
static HEATER_PINS: StaticCell<[SharedPin; CHANNEL_COUNT]> = StaticCell::new();
static STAND_INPUTS: StaticCell<[Input<'static>; STAND_COUNT]> = StaticCell::new();
static ADC: StaticCell<RefCell<Adc<'static, Blocking>>> = StaticCell::new();
static STATION: StaticCell<BoardStation> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ember firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (pins, fixed) = board::split(p);
    info!("Peripherals initialized");

    // Heater gates, off until the first window
    let mut heater_gates = pins.heaters.into_iter();
    let heater_pins: &'static [SharedPin; CHANNEL_COUNT] =
        HEATER_PINS.init(core::array::from_fn(|i| {
            let pin = heater_gates.next().unwrap();
            share(Output::new(pin, Level::from(HEATER_INVERTED[i])))
        }));

    // Stand contacts, possibly shared by two channels
    let mut stand_pins = pins.stands.into_iter();
    let stand_inputs: &'static [Input<'static>; STAND_COUNT] =
        STAND_INPUTS.init(core::array::from_fn(|i| {
            let pull = if STAND_PULL_UP[i] { Pull::Up } else { Pull::None };
            Input::new(stand_pins.next().unwrap(), pull)
        }));

    // Thermocouple inputs on the shared ADC
    let adc: &'static RefCell<Adc<'static, Blocking>> =
        ADC.init(RefCell::new(Adc::new_blocking(fixed.adc, AdcConfig::default())));
    let mut adc_channels = fixed.adc_channels.into_iter();

    // Configuration EEPROM
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = EEPROM_FREQUENCY;
    let i2c = I2c::new_blocking(fixed.i2c, fixed.i2c_scl, fixed.i2c_sda, i2c_config);
    let store = Eeprom24x::new(i2c, EmbassyClock);
    info!("EEPROM on I2C0 at {} Hz", EEPROM_FREQUENCY);

    let channels: [Channel<'static, _, _, _>; CHANNEL_COUNT] = core::array::from_fn(|i| {
        let input = AdcThermocouple::new(RpAdcInput::new(adc, adc_channels.next().unwrap()));
        let contact = RpInput::new(&stand_inputs[STAND_OF_CHANNEL[i]]);
        let stand = if STAND_ACTIVE_HIGH[STAND_OF_CHANNEL[i]] {
            GpioStand::new_active_high(contact)
        } else {
            GpioStand::new(contact)
        };
        let cutoff = GpioHeater::attach(SharedOutput::new(&heater_pins[i]), HEATER_INVERTED[i]);
        let chain = SensorChain {
            gain: GAINS[i],
            vref: ADC_VREF,
        };
        Channel::new(i, &LINKS[i], input, stand, cutoff, chain).with_recovery_time(AMP_RECOVERY_US)
    });
    let station = STATION.init(Station::new(channels, store));
    info!("{} heater channels configured", CHANNEL_COUNT);

    // Zero-cross output stage
    let outputs: [FiringOutput<'static, _>; CHANNEL_COUNT] = core::array::from_fn(|i| {
        FiringOutput::new(
            &LINKS[i],
            GpioHeater::new(SharedOutput::new(&heater_pins[i]), HEATER_INVERTED[i]),
        )
    });
    let stage = OutputStage::new(ZERO_CROSS_PERIOD, outputs);
    let zc_pull = if ZERO_CROSS_PULL_UP { Pull::Up } else { Pull::None };
    let detector = Input::new(pins.zero_cross, zc_pull);

    let led = RpOutput(Output::new(pins.heartbeat, Level::from(HEARTBEAT_INVERTED)));

    // Setup UART for the command console
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = CONSOLE_BAUD;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(fixed.uart, fixed.uart_tx, fixed.uart_rx, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", CONSOLE_BAUD);

    // High priority executor for the zero-cross edges
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner
        .spawn(tasks::zero_cross_task(detector, stage))
        .unwrap();

    // Spawn tasks
    spawner.spawn(tasks::heartbeat_task(led)).unwrap();
    spawner.spawn(tasks::console_rx_task(rx)).unwrap();
    spawner.spawn(tasks::console_tx_task(tx)).unwrap();
    spawner.spawn(tasks::control_task(station)).unwrap();

    info!("All tasks spawned, firmware running");
}
