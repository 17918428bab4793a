//! Tool stand sensor
//!
//! The stand closes a contact to ground while the iron rests in it, so the
//! default polarity reads "resting" on a low pin.

use ember_core::traits::StandSensor;
use ember_hal::InputPin;

/// Stand contact on a GPIO input
pub struct GpioStand<P> {
    pin: P,
    /// If true, resting = pin HIGH
    active_high: bool,
}

impl<P: InputPin> GpioStand<P> {
    /// Stand contact that pulls the pin low while resting
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_high: false,
        }
    }

    /// Stand contact that drives the pin high while resting
    pub fn new_active_high(pin: P) -> Self {
        Self {
            pin,
            active_high: true,
        }
    }
}

impl<P: InputPin> StandSensor for GpioStand<P> {
    fn is_resting(&self) -> bool {
        self.pin.is_high() == self.active_high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct MockInput<'a> {
        high: &'a Cell<bool>,
    }

    impl InputPin for MockInput<'_> {
        fn is_high(&self) -> bool {
            self.high.get()
        }
    }

    #[test]
    fn test_low_means_resting() {
        let level = Cell::new(true);
        let stand = GpioStand::new(MockInput { high: &level });
        assert!(!stand.is_resting());
        level.set(false);
        assert!(stand.is_resting());
    }

    #[test]
    fn test_active_high_polarity() {
        let level = Cell::new(true);
        let stand = GpioStand::new_active_high(MockInput { high: &level });
        assert!(stand.is_resting());
    }

    #[test]
    fn test_shared_pin() {
        // Two channels wired to one stand contact
        let level = Cell::new(false);
        let a = GpioStand::new(MockInput { high: &level });
        let b = GpioStand::new(MockInput { high: &level });
        assert!(a.is_resting() && b.is_resting());
        level.set(true);
        assert!(!a.is_resting() && !b.is_resting());
    }
}
