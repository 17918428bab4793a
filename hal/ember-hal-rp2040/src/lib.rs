//! RP2040-specific HAL for the soldering station firmware
//!
//! Implements the `ember-hal` traits on top of `embassy-rp`:
//!
//! - GPIO outputs and inputs, including a heater pin shared between the
//!   zero-cross task and the main loop
//! - Board pins taken by number from generated board configuration
//! - ADC channels sharing the single converter
//! - Microsecond clock on the embassy time driver

#![no_std]

pub mod adc;
pub mod gpio;
pub mod pins;
pub mod time;

pub use adc::RpAdcInput;
pub use gpio::{share, RpInput, RpOutput, SharedOutput, SharedPin};
pub use time::EmbassyClock;
