//! Analog input abstraction

/// Blocking single-channel ADC reader
///
/// Returns raw conversion codes. The resolution is a property of the
/// implementation and is reported so callers can detect full-scale readings.
pub trait AdcReader {
    /// Error type for conversions
    type Error;

    /// Perform one conversion and return the raw code
    fn read_raw(&mut self) -> Result<u16, Self::Error>;

    /// Converter resolution in bits
    fn resolution_bits(&self) -> u8;

    /// Number of distinct codes (`2^bits`)
    fn full_scale(&self) -> u32 {
        1u32 << self.resolution_bits()
    }
}
