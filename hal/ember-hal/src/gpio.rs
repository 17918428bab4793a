//! Digital pins
//!
//! Heater gates and the heartbeat LED are outputs, stand contacts are
//! inputs. Levels here are electrical; gate polarity and the resting level
//! of a stand contact are handled by the drivers.

/// Push-pull output driving a heater gate or an indicator
pub trait OutputPin {
    /// Drive the pin high (`true`) or low (`false`)
    fn set_level(&mut self, high: bool);

    /// Level currently driven, read back from the output latch
    ///
    /// A gate shared by several handles reports the level set through any
    /// of them.
    fn is_set_high(&self) -> bool;
}

/// Sampled digital input such as a stand contact
pub trait InputPin {
    /// Electrical level at the pin
    fn is_high(&self) -> bool;
}
