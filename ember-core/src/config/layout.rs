//! Storage layout of a channel configuration
//!
//! The layout is declared data: an ordered list of 32-bit float slots.
//! Scalars come first, then each calibration point as voltage followed by
//! temperature. Channel `n` starts at `n * FOOTPRINT`.
//!
//! ```text
//! offset  0   voltage_setpoint
//! offset  4   setpoint_min_c
//! ...
//! offset 36   runaway_threshold_c
//! offset 40   table[0].voltage_uv
//! offset 44   table[0].temperature_c
//! ...
//! offset 116  table[9].temperature_c
//! ```

use crate::calibration::TABLE_SIZE;
use crate::config::ChannelConfig;

/// Width of every stored value in bytes
pub const SLOT_WIDTH: usize = 4;

/// Scalar configuration fields, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    VoltageSetpoint,
    SetpointMin,
    SetpointMax,
    Kp,
    Ki,
    Kd,
    DerivativeTau,
    SleepDelay,
    SleepVoltageSetpoint,
    RunawayThreshold,
}

/// Scalar fields in storage order
pub const FIELDS: [Field; 10] = [
    Field::VoltageSetpoint,
    Field::SetpointMin,
    Field::SetpointMax,
    Field::Kp,
    Field::Ki,
    Field::Kd,
    Field::DerivativeTau,
    Field::SleepDelay,
    Field::SleepVoltageSetpoint,
    Field::RunawayThreshold,
];

/// Which coordinate of a calibration point a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Coordinate {
    Voltage,
    Temperature,
}

/// One stored float
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// A scalar field
    Scalar(Field),
    /// One coordinate of a calibration point
    Point(usize, Coordinate),
}

/// Number of stored floats per channel
pub const SLOT_COUNT: usize = FIELDS.len() + 2 * TABLE_SIZE;

/// Bytes occupied by one channel
pub const FOOTPRINT: usize = SLOT_COUNT * SLOT_WIDTH;

/// Every slot in storage order
pub const SLOTS: [Slot; SLOT_COUNT] = build_slots();

const fn build_slots() -> [Slot; SLOT_COUNT] {
    let mut slots = [Slot::Scalar(Field::VoltageSetpoint); SLOT_COUNT];
    let mut i = 0;
    while i < FIELDS.len() {
        slots[i] = Slot::Scalar(FIELDS[i]);
        i += 1;
    }
    let mut point = 0;
    while point < TABLE_SIZE {
        slots[FIELDS.len() + 2 * point] = Slot::Point(point, Coordinate::Voltage);
        slots[FIELDS.len() + 2 * point + 1] = Slot::Point(point, Coordinate::Temperature);
        point += 1;
    }
    slots
}

/// First byte of a channel's record
pub const fn base_address(channel: usize) -> usize {
    channel * FOOTPRINT
}

/// Byte offset of the `index`-th slot within a record
pub const fn slot_offset(index: usize) -> usize {
    index * SLOT_WIDTH
}

impl ChannelConfig {
    /// Value held in a slot
    pub fn slot(&self, slot: Slot) -> f32 {
        match slot {
            Slot::Scalar(field) => self.field(field),
            Slot::Point(index, Coordinate::Voltage) => self.table.points()[index].voltage_uv,
            Slot::Point(index, Coordinate::Temperature) => {
                self.table.points()[index].temperature_c
            }
        }
    }

    /// Mutable reference to the value held in a slot
    pub fn slot_mut(&mut self, slot: Slot) -> &mut f32 {
        match slot {
            Slot::Scalar(field) => self.field_mut(field),
            Slot::Point(index, Coordinate::Voltage) => {
                &mut self.table.points_mut()[index].voltage_uv
            }
            Slot::Point(index, Coordinate::Temperature) => {
                &mut self.table.points_mut()[index].temperature_c
            }
        }
    }

    /// Value of a scalar field
    pub fn field(&self, field: Field) -> f32 {
        match field {
            Field::VoltageSetpoint => self.voltage_setpoint,
            Field::SetpointMin => self.setpoint_min_c,
            Field::SetpointMax => self.setpoint_max_c,
            Field::Kp => self.gains.kp,
            Field::Ki => self.gains.ki,
            Field::Kd => self.gains.kd,
            Field::DerivativeTau => self.gains.derivative_tau_s,
            Field::SleepDelay => self.sleep_delay_s,
            Field::SleepVoltageSetpoint => self.sleep_voltage_setpoint,
            Field::RunawayThreshold => self.runaway_threshold_c,
        }
    }

    /// Mutable reference to a scalar field
    pub fn field_mut(&mut self, field: Field) -> &mut f32 {
        match field {
            Field::VoltageSetpoint => &mut self.voltage_setpoint,
            Field::SetpointMin => &mut self.setpoint_min_c,
            Field::SetpointMax => &mut self.setpoint_max_c,
            Field::Kp => &mut self.gains.kp,
            Field::Ki => &mut self.gains.ki,
            Field::Kd => &mut self.gains.kd,
            Field::DerivativeTau => &mut self.gains.derivative_tau_s,
            Field::SleepDelay => &mut self.sleep_delay_s,
            Field::SleepVoltageSetpoint => &mut self.sleep_voltage_setpoint,
            Field::RunawayThreshold => &mut self.runaway_threshold_c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::hardware::MAX_CHANNELS;

    #[test]
    fn test_footprint() {
        assert_eq!(FOOTPRINT, 120);
        assert_eq!(base_address(0), 0);
        assert_eq!(base_address(3), 360);
        // Four channels fit a 2 KiB EEPROM
        assert!(base_address(MAX_CHANNELS) <= 2048);
    }

    #[test]
    fn test_slot_order() {
        assert_eq!(SLOTS[0], Slot::Scalar(Field::VoltageSetpoint));
        assert_eq!(SLOTS[9], Slot::Scalar(Field::RunawayThreshold));
        assert_eq!(SLOTS[10], Slot::Point(0, Coordinate::Voltage));
        assert_eq!(SLOTS[11], Slot::Point(0, Coordinate::Temperature));
        assert_eq!(SLOTS[29], Slot::Point(9, Coordinate::Temperature));
        assert_eq!(slot_offset(10), 40);
    }

    #[test]
    fn test_slots_address_distinct_values() {
        let mut config = ChannelConfig::zeroed();
        for (i, slot) in SLOTS.iter().enumerate() {
            *config.slot_mut(*slot) = i as f32;
        }
        for (i, slot) in SLOTS.iter().enumerate() {
            assert_eq!(config.slot(*slot), i as f32);
        }
        assert_eq!(config.gains.kd, 5.0);
        assert_eq!(config.table.points()[9].temperature_c, 29.0);
    }
}
