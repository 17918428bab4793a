//! Error types
//!
//! Every failure carries the reply text the operator sees.

use ember_protocol::{CalibrationError, LineError};

use crate::safety::RunawayCause;
use crate::traits::StoreError;

/// Reply text for any persistence failure
pub const SAVE_FAILED: &str = "FAIL TO SAVE";

/// Errors from channel operations and commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Malformed or out-of-range value; channel state unchanged
    InvalidInput(&'static str),
    /// Value outside what the sensor chain can represent; state unchanged
    HardwareLimitExceeded(&'static str),
    /// Set request on a query-only command
    ReadOnly(&'static str),
    /// Storage write or read failed
    Persistence(StoreError),
    /// Channel was cut off by runaway protection
    Runaway(RunawayCause),
}

impl Error {
    /// Human readable reply text
    pub fn message(&self) -> &'static str {
        match self {
            Error::InvalidInput(msg) | Error::HardwareLimitExceeded(msg) | Error::ReadOnly(msg) => {
                msg
            }
            Error::Persistence(_) => SAVE_FAILED,
            Error::Runaway(RunawayCause::OverTemperature) => "runaway: over temperature",
            Error::Runaway(RunawayCause::SensorSaturated) => "runaway: sensor saturated",
            Error::Runaway(RunawayCause::SensorFault) => "runaway: sensor fault",
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Persistence(e)
    }
}

impl From<LineError> for Error {
    fn from(e: LineError) -> Self {
        Error::InvalidInput(e.message())
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Error::InvalidInput(e.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::InvalidInput("out of bounds").message(), "out of bounds");
        assert_eq!(
            Error::Persistence(StoreError::Timeout).message(),
            "FAIL TO SAVE"
        );
        assert_eq!(Error::from(LineError::UnknownCommand).message(), "Unknown command");
        assert_eq!(
            Error::Runaway(RunawayCause::SensorSaturated).message(),
            "runaway: sensor saturated"
        );
        assert_eq!(
            Error::from(CalibrationError::Format).message(),
            "Format must be index[x,y]"
        );
    }
}
