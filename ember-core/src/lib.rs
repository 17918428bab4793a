//! Board-agnostic thermal control engine for the soldering station
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (thermocouple, heater, stand, storage)
//! - Thermocouple calibration table and conversions
//! - PID controller with back-calculation anti-windup
//! - Sleep state machine and runaway protection
//! - Zero-cross burst-fire scheduler
//! - Persisted channel configuration and its storage layout
//! - Command execution against a channel

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod channel;
pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod persistence;
pub mod safety;
pub mod scheduler;
pub mod station;
pub mod traits;

pub use channel::{Channel, ChannelEvent, ChannelStatus};
pub use error::Error;
pub use station::Station;
