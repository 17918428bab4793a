//! Hardware abstraction traits
//!
//! These traits define the interface between the control engine and
//! hardware-specific implementations.

pub mod heater;
pub mod store;

pub use heater::{HeaterOutput, SensorError, StandSensor, ThermocoupleInput};
pub use store::{PersistentStore, StoreError};
