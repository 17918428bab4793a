//! Sensor implementations

pub mod stand;
pub mod thermocouple;

pub use stand::GpioStand;
pub use thermocouple::AdcThermocouple;
