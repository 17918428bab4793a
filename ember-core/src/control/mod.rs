//! Closed-loop control
//!
//! The PID engine and the stand-driven sleep state machine.

pub mod pid;
pub mod sleep;

pub use pid::{PidGains, PidState, MIN_DT_S, OUTPUT_MAX, OUTPUT_MIN};
pub use sleep::{SleepMachine, SleepState};
