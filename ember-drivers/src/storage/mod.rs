//! Non-volatile configuration storage

pub mod eeprom;

pub use eeprom::Eeprom24x;
