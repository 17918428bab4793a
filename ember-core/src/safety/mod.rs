//! Safety logic
//!
//! Runaway detection for heater channels.

pub mod runaway;

pub use runaway::{RunawayCause, RunawayMonitor, Sample, SafetyStatus};
