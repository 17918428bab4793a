//! Ember Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the station needs from
//! a chip-specific HAL. The control engine and drivers only see these traits,
//! so the same code runs on the RP2040 board and under host unit tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (ember-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ember-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ ember-hal-rp2040│
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`adc::AdcReader`] - Raw analog sampling
//! - [`time::Clock`] - Free-running microsecond clock

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod time;

// Re-export key traits at crate root for convenience
pub use adc::AdcReader;
pub use gpio::{InputPin, OutputPin};
pub use time::Clock;
