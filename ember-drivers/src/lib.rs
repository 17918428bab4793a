//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in ember-core on top of the ember-hal pin, ADC and clock traits:
//!
//! - Heater gate output (triac/SSR on a GPIO)
//! - Thermocouple amplifier input (ADC) and tool stand sensor (GPIO)
//! - 24C16-class I2C EEPROM configuration store on any `embedded-hal` bus

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod heater;
pub mod sensor;
pub mod storage;
