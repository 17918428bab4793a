//! Ember command line protocol
//!
//! The station is configured over a line-oriented text protocol, shared by
//! the USB console and the HMI link:
//!
//! ```text
//! ┌────────────┬───┬─────────┬───┬────────────────┐
//! │ CHANNEL ID │ : │ COMMAND │ : │ VALUE or "?"   │
//! │ digits     │   │ name    │   │ text           │
//! └────────────┴───┴─────────┴───┴────────────────┘
//! ```
//!
//! `?` queries the current value, anything else is a set request. Replies
//! are single lines; failed requests are prefixed with `ERROR `.
//!
//! This crate only handles the text: line framing, the command registry,
//! the decimal number grammar and reply formatting. Executing a command
//! against a heater channel is done by `ember-core`.

#![no_std]
#![deny(unsafe_code)]

pub mod calibration;
pub mod command;
pub mod format;
pub mod line;
pub mod number;

pub use calibration::{CalibrationError, CalibrationRequest};
pub use command::CommandKind;
pub use format::{Reply, REPLY_CAPACITY};
pub use line::{Argument, CommandLine, LineBuffer, LineError, MAX_LINE_LENGTH};
pub use number::{parse_decimal, parse_flag, NumberError};
