//! Thermocouple amplifier input
//!
//! The amplifier output is sampled by a plain ADC channel; gain and
//! reference voltage are applied by the channel's sensor chain.

use ember_core::traits::{SensorError, ThermocoupleInput};
use ember_hal::AdcReader;

/// Thermocouple amplifier on an ADC channel
pub struct AdcThermocouple<A> {
    adc: A,
}

impl<A: AdcReader> AdcThermocouple<A> {
    /// Wrap an ADC channel
    pub fn new(adc: A) -> Self {
        Self { adc }
    }
}

impl<A: AdcReader> ThermocoupleInput for AdcThermocouple<A> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let raw = self
            .adc
            .read_raw()
            .map_err(|_| SensorError::ConversionError)?;
        // A code outside the converter range means a broken driver or bus
        if u32::from(raw) >= self.adc.full_scale() {
            return Err(SensorError::ConversionError);
        }
        Ok(raw)
    }

    fn full_scale(&self) -> u32 {
        self.adc.full_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAdc {
        result: Result<u16, ()>,
    }

    impl AdcReader for MockAdc {
        type Error = ();

        fn read_raw(&mut self) -> Result<u16, ()> {
            self.result
        }

        fn resolution_bits(&self) -> u8 {
            12
        }
    }

    #[test]
    fn test_reads_raw_code() {
        let mut tc = AdcThermocouple::new(MockAdc { result: Ok(1234) });
        assert_eq!(tc.read_raw(), Ok(1234));
        assert_eq!(tc.full_scale(), 4096);
        assert_eq!(tc.saturation_code(), 4095);
    }

    #[test]
    fn test_conversion_error() {
        let mut tc = AdcThermocouple::new(MockAdc { result: Err(()) });
        assert_eq!(tc.read_raw(), Err(SensorError::ConversionError));
    }

    #[test]
    fn test_out_of_range_code_rejected() {
        let mut tc = AdcThermocouple::new(MockAdc { result: Ok(4096) });
        assert_eq!(tc.read_raw(), Err(SensorError::ConversionError));
    }
}
