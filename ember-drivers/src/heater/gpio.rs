//! GPIO heater output
//!
//! Drives the optotriac or SSR input of one heating element. The heater
//! state is read back from the pin, so several handles on the same
//! physical pin (zero-cross task and runaway cutoff) always agree.

use ember_core::traits::HeaterOutput;
use ember_hal::OutputPin;

/// GPIO heater output
///
/// The pin can be configured as active-high (default) or active-low.
pub struct GpioHeater<P> {
    pin: P,
    /// If true, heater ON = pin LOW
    inverted: bool,
}

impl<P: OutputPin> GpioHeater<P> {
    /// Create a new GPIO heater output, switched off
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, heater is ON when pin is LOW (for active-low SSRs)
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut heater = Self { pin, inverted };
        heater.set_on(false);
        heater
    }

    /// Create a new GPIO heater with active-high output
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a new GPIO heater with active-low output
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Wrap a pin without touching its state
    ///
    /// Used for a second handle on a pin that is already owned by another
    /// heater output.
    pub fn attach(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }
}

impl<P: OutputPin> HeaterOutput for GpioHeater<P> {
    fn set_on(&mut self, on: bool) {
        // on=true, inverted=false → high; on=true, inverted=true → low
        self.pin.set_level(on != self.inverted);
    }

    fn is_on(&self) -> bool {
        self.pin.is_set_high() != self.inverted
    }
}
