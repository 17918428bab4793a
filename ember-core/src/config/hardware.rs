//! Hardware constants and sensor chain description

/// Maximum number of heater channels on one controller
pub const MAX_CHANNELS: usize = 4;

/// ADC resolution of the reference board
pub const ADC_BITS: u8 = 12;

/// ADC reference voltage (V)
pub const ADC_VREF: f32 = 3.3;

/// Settling time of the thermocouple amplifier after the heater
/// switches off (µs)
pub const AMP_RECOVERY_US: u32 = 1_700;

/// Half-cycles per burst-fire window
pub const ZERO_CROSS_PERIOD: u8 = 10;

/// Amplifier gains of the reference board, one per channel
pub const BOARD_GAINS: [f32; MAX_CHANNELS] = [200.0, 400.0, 400.0, 400.0];

/// Thermocouple amplifier and converter in front of one channel
///
/// The measurable span starts at 0 µV; the top of the span is the ADC
/// reference referred back through the amplifier gain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorChain {
    /// Amplifier voltage gain
    pub gain: f32,
    /// ADC reference voltage (V)
    pub vref: f32,
}

impl SensorChain {
    /// Sensor chain with the board reference voltage
    pub const fn new(gain: f32) -> Self {
        Self {
            gain,
            vref: ADC_VREF,
        }
    }

    /// Largest thermocouple voltage the chain can represent (µV)
    pub fn max_microvolts(&self) -> f32 {
        self.vref * 1e6 / self.gain
    }

    /// Convert a raw ADC code to thermocouple voltage (µV)
    ///
    /// # Arguments
    /// - `raw`: conversion result
    /// - `full_scale`: number of ADC codes (4096 for 12 bit)
    pub fn to_microvolts(&self, raw: u16, full_scale: u32) -> f32 {
        let adc_volts = f32::from(raw) / full_scale as f32 * self.vref;
        adc_volts / self.gain * 1e6
    }
}
