//! Heater, thermocouple and stand sensor traits

/// Errors that can occur while sampling the thermocouple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// ADC conversion failed or timed out
    ConversionError,
}

/// Raw thermocouple amplifier input
///
/// Implementations return ADC codes; the channel converts them to
/// microvolts with its amplifier gain and the converter reference.
pub trait ThermocoupleInput {
    /// Sample the amplifier output
    fn read_raw(&mut self) -> Result<u16, SensorError>;

    /// Number of distinct codes the converter produces
    fn full_scale(&self) -> u32;

    /// Code at which the amplifier or converter is saturated
    fn saturation_code(&self) -> u32 {
        self.full_scale().saturating_sub(1)
    }
}

/// Trait for heater output control
///
/// Implementations drive the triac/SSR gate of one heating element.
pub trait HeaterOutput {
    /// Turn the heater on or off
    fn set_on(&mut self, on: bool);

    /// Check if the heater is currently on
    fn is_on(&self) -> bool;
}

/// Tool holder presence sensor
pub trait StandSensor {
    /// True while the tool rests in its stand
    fn is_resting(&self) -> bool;
}
