//! Runaway protection
//!
//! A channel is cut off when a sample reads above its runaway threshold,
//! when the converter is pinned at full scale (open thermocouple or
//! amplifier fault), or when the reading cannot be converted at all. The
//! check runs on every sample and has no configuration switch.

/// One thermocouple sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Raw ADC code
    pub raw: u16,
    /// Thermocouple voltage (µV)
    pub voltage_uv: f32,
    /// Calibrated temperature (°C), `None` if the table could not convert
    pub temperature_c: Option<f32>,
}

/// Why a channel was cut off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunawayCause {
    /// Temperature above the runaway threshold
    OverTemperature,
    /// ADC reading at full scale
    SensorSaturated,
    /// ADC read failed or the reading could not be calibrated
    SensorFault,
}

/// Result of a runaway check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// Sample is plausible and below the threshold
    Ok,
    /// Channel must be cut off
    Fault(RunawayCause),
}

/// Runaway check parameters for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunawayMonitor {
    /// Cutout temperature (°C)
    pub threshold_c: f32,
    /// ADC code treated as saturated
    pub saturation_code: u32,
}

impl RunawayMonitor {
    /// Check a sample
    ///
    /// Saturation wins over the temperature check since a saturated
    /// reading says nothing about the real temperature.
    pub fn check(&self, sample: &Sample) -> SafetyStatus {
        if u32::from(sample.raw) >= self.saturation_code {
            return SafetyStatus::Fault(RunawayCause::SensorSaturated);
        }

        match sample.temperature_c {
            None => SafetyStatus::Fault(RunawayCause::SensorFault),
            Some(t) if t > self.threshold_c => SafetyStatus::Fault(RunawayCause::OverTemperature),
            Some(_) => SafetyStatus::Ok,
        }
    }
}
