//! Heater output implementations

pub mod gpio;

pub use gpio::GpioHeater;
