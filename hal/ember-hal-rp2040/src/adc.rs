//! ADC channels
//!
//! RP2040 has a single 12-bit converter multiplexed over four pins:
//! - ADC0: GPIO26
//! - ADC1: GPIO27
//! - ADC2: GPIO28
//! - ADC3: GPIO29
//!
//! Every thermocouple input borrows the converter for one blocking
//! conversion, so all inputs share it through a `RefCell`.

use core::cell::RefCell;

use embassy_rp::adc::{Adc, Blocking, Channel};
use ember_hal::AdcReader;

/// Errors from a shared ADC input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Converter is in use by another input
    Busy,
    /// Conversion reported an error
    Conversion,
}

/// One ADC pin on the shared converter
pub struct RpAdcInput {
    adc: &'static RefCell<Adc<'static, Blocking>>,
    channel: Channel<'static>,
}

impl RpAdcInput {
    /// Bind a channel to the shared converter
    pub fn new(adc: &'static RefCell<Adc<'static, Blocking>>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for RpAdcInput {
    type Error = AdcError;

    fn read_raw(&mut self) -> Result<u16, AdcError> {
        let mut adc = self.adc.try_borrow_mut().map_err(|_| AdcError::Busy)?;
        adc.blocking_read(&mut self.channel)
            .map_err(|_| AdcError::Conversion)
    }

    fn resolution_bits(&self) -> u8 {
        12
    }
}
