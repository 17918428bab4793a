//! Board description
//!
//! Constants and the peripheral split are generated from board.toml by the
//! build script. This module also names the concrete driver types the
//! station is built from.

use embassy_rp::adc;
use embassy_rp::gpio::AnyPin;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::{ADC, I2C0, PIN_0, PIN_1, PIN_4, PIN_5, UART0};
use embassy_rp::Peri;

use ember_core::Station;
use ember_drivers::heater::GpioHeater;
use ember_drivers::sensor::{AdcThermocouple, GpioStand};
use ember_drivers::storage::Eeprom24x;
use ember_hal_rp2040::{EmbassyClock, RpAdcInput, RpInput, SharedOutput};

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Configurable GPIOs, typed by number
pub struct BoardPins {
    pub heaters: [Peri<'static, AnyPin>; CHANNEL_COUNT],
    pub stands: [Peri<'static, AnyPin>; STAND_COUNT],
    pub zero_cross: Peri<'static, AnyPin>,
    pub heartbeat: Peri<'static, AnyPin>,
}

/// Peripherals with a fixed function on the board
pub struct FixedPeripherals {
    pub uart: Peri<'static, UART0>,
    pub uart_tx: Peri<'static, PIN_0>,
    pub uart_rx: Peri<'static, PIN_1>,
    pub i2c: Peri<'static, I2C0>,
    pub i2c_sda: Peri<'static, PIN_4>,
    pub i2c_scl: Peri<'static, PIN_5>,
    pub adc: Peri<'static, ADC>,
    pub adc_channels: [adc::Channel<'static>; CHANNEL_COUNT],
}

/// Heater gate handle shared by the zero-cross task and its channel
pub type Heater = GpioHeater<SharedOutput>;

/// Thermocouple input on the shared ADC
pub type Thermocouple = AdcThermocouple<RpAdcInput>;

/// Stand contact
pub type Stand = GpioStand<RpInput>;

/// Configuration EEPROM
pub type Store = Eeprom24x<I2c<'static, I2C0, Blocking>, EmbassyClock>;

/// All channels of the board with their store
pub type BoardStation = Station<'static, Thermocouple, Stand, Heater, Store, CHANNEL_COUNT>;
