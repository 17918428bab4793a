//! Persisted per-channel configuration

use crate::calibration::CalibrationTable;
use crate::control::PidGains;

/// Lower setpoint limit after a restore (°C)
pub const DEFAULT_SETPOINT_MIN_C: f32 = 100.0;
/// Upper setpoint limit after a restore (°C)
pub const DEFAULT_SETPOINT_MAX_C: f32 = 400.0;
/// Derivative filter time constant after a restore (s)
pub const DEFAULT_DERIVATIVE_TAU_S: f32 = 0.25;
/// Stand-to-sleep delay after a restore (s)
pub const DEFAULT_SLEEP_DELAY_S: f32 = 30.0;
/// Sleep setpoint after a restore (°C)
pub const DEFAULT_SLEEP_TEMPERATURE_C: f32 = 150.0;
/// Runaway cutout after a restore (°C)
pub const DEFAULT_RUNAWAY_C: f32 = 480.0;

/// Accepted thermocouple sensitivity range for a restore (µV/K)
pub const MAX_SENSITIVITY_UV_PER_K: f32 = 40.0;

/// Tunable state of one heater channel
///
/// Every field survives power cycles. Setpoints used by the controller are
/// stored as thermocouple voltages so they stay valid whatever the
/// calibration table does to the temperature scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Live control target (µV)
    pub voltage_setpoint: f32,
    /// Lowest accepted temperature setpoint (°C)
    pub setpoint_min_c: f32,
    /// Highest accepted temperature setpoint (°C)
    pub setpoint_max_c: f32,
    /// PID tuning
    pub gains: PidGains,
    /// Time on the stand before the sleep setpoint takes over (s)
    pub sleep_delay_s: f32,
    /// Control target while sleeping (µV)
    pub sleep_voltage_setpoint: f32,
    /// Measured temperature that trips the runaway cutout (°C)
    pub runaway_threshold_c: f32,
    /// Thermocouple linearisation
    pub table: CalibrationTable,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl ChannelConfig {
    /// All-zero configuration, the state before anything was loaded
    pub const fn zeroed() -> Self {
        Self {
            voltage_setpoint: 0.0,
            setpoint_min_c: 0.0,
            setpoint_max_c: 0.0,
            gains: PidGains::zeroed(),
            sleep_delay_s: 0.0,
            sleep_voltage_setpoint: 0.0,
            runaway_threshold_c: 0.0,
            table: CalibrationTable::zeroed(),
        }
    }

    /// Factory configuration for a thermocouple of the given sensitivity
    ///
    /// The table is regenerated first so both voltage setpoints are
    /// derived from it: the live target starts at the setpoint minimum.
    /// Returns `None` unless `0 < sensitivity <= 40` µV/K.
    pub fn restored(sensitivity_uv_per_k: f32) -> Option<Self> {
        if !(sensitivity_uv_per_k > 0.0 && sensitivity_uv_per_k <= MAX_SENSITIVITY_UV_PER_K) {
            return None;
        }

        let table = CalibrationTable::linear(sensitivity_uv_per_k);
        // The linear table is strictly increasing, conversions cannot fail.
        let to_voltage = |t: f32| table.temperature_to_voltage(t).unwrap_or(t * sensitivity_uv_per_k);

        Some(Self {
            voltage_setpoint: to_voltage(DEFAULT_SETPOINT_MIN_C),
            setpoint_min_c: DEFAULT_SETPOINT_MIN_C,
            setpoint_max_c: DEFAULT_SETPOINT_MAX_C,
            gains: PidGains {
                kp: 0.0,
                ki: 0.0,
                kd: 0.0,
                derivative_tau_s: DEFAULT_DERIVATIVE_TAU_S,
            },
            sleep_delay_s: DEFAULT_SLEEP_DELAY_S,
            sleep_voltage_setpoint: to_voltage(DEFAULT_SLEEP_TEMPERATURE_C),
            runaway_threshold_c: DEFAULT_RUNAWAY_C,
            table,
        })
    }

    /// Sleep delay in microseconds, saturating
    pub fn sleep_delay_us(&self) -> u64 {
        // Float-to-int casts saturate; negative and NaN become 0.
        (f64::from(self.sleep_delay_s) * 1e6) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restored_values() {
        let config = ChannelConfig::restored(40.0).unwrap();
        assert_eq!(config.setpoint_min_c, 100.0);
        assert_eq!(config.setpoint_max_c, 400.0);
        assert_eq!(config.gains.kp, 0.0);
        assert_eq!(config.gains.derivative_tau_s, 0.25);
        assert_eq!(config.sleep_delay_s, 30.0);
        assert_eq!(config.runaway_threshold_c, 480.0);
        assert!((config.sleep_voltage_setpoint - 6000.0).abs() < 1e-2);
        assert!((config.voltage_setpoint - 4000.0).abs() < 1e-2);
    }

    #[test]
    fn test_restore_sensitivity_range() {
        assert!(ChannelConfig::restored(0.0).is_none());
        assert!(ChannelConfig::restored(-5.0).is_none());
        assert!(ChannelConfig::restored(40.01).is_none());
        assert!(ChannelConfig::restored(f32::NAN).is_none());
        assert!(ChannelConfig::restored(40.0).is_some());
        assert!(ChannelConfig::restored(0.001).is_some());
    }

    #[test]
    fn test_sleep_delay_conversion() {
        let mut config = ChannelConfig::zeroed();
        config.sleep_delay_s = 30.0;
        assert_eq!(config.sleep_delay_us(), 30_000_000);
        config.sleep_delay_s = -1.0;
        assert_eq!(config.sleep_delay_us(), 0);
        config.sleep_delay_s = 5000.0;
        assert_eq!(config.sleep_delay_us(), 5_000_000_000);
        config.sleep_delay_s = f32::INFINITY;
        assert_eq!(config.sleep_delay_us(), u64::MAX);
    }
}
