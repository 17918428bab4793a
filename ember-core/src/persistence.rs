//! Channel configuration persistence
//!
//! Records are written and read slot by slot following
//! [`config::layout::SLOTS`](crate::config::layout::SLOTS). Both directions
//! visit every slot even after a failure and report the first error, so a
//! failed save still writes as much of the record as the device accepts.
//! Nothing is rolled back; the operator retries the command.

use crate::config::layout::{slot_offset, SLOTS};
use crate::config::ChannelConfig;
use crate::traits::{PersistentStore, StoreError};

/// Write a configuration record at `base`
pub fn save<P: PersistentStore>(
    store: &mut P,
    base: usize,
    config: &ChannelConfig,
) -> Result<(), StoreError> {
    let mut result = Ok(());
    for (i, slot) in SLOTS.iter().enumerate() {
        let written = store.write_f32(base + slot_offset(i), config.slot(*slot));
        if result.is_ok() {
            result = written;
        }
    }

    result
}

/// Read a configuration record at `base` into `config`
///
/// Slots that read back are applied in place, slots that fail keep their
/// previous value. An error means the record may be a mix of stored and
/// previous values.
pub fn load<P: PersistentStore>(
    store: &mut P,
    base: usize,
    config: &mut ChannelConfig,
) -> Result<(), StoreError> {
    let mut result = Ok(());
    for (i, slot) in SLOTS.iter().enumerate() {
        match store.read_f32(base + slot_offset(i)) {
            Ok(value) => *config.slot_mut(*slot) = value,
            Err(e) => {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
    }

    result
}
