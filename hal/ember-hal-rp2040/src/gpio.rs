//! GPIO pins
//!
//! The heater gate is driven from two places: the zero-cross task fires it
//! and the main loop forces it off on runaway. Both hold a [`SharedOutput`]
//! handle on the same [`SharedPin`], a critical-section mutex around the
//! embassy output.

use core::cell::RefCell;

use embassy_rp::gpio::{Input, Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use ember_hal::{InputPin, OutputPin};

/// Output pin owned by a single user
pub struct RpOutput(pub Output<'static>);

impl OutputPin for RpOutput {
    fn set_level(&mut self, high: bool) {
        self.0.set_level(Level::from(high));
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Output pin behind a critical-section mutex
pub type SharedPin = Mutex<CriticalSectionRawMutex, RefCell<Output<'static>>>;

/// Wrap an output so it can be shared
pub fn share(pin: Output<'static>) -> SharedPin {
    Mutex::new(RefCell::new(pin))
}

/// Handle on a [`SharedPin`]
#[derive(Clone, Copy)]
pub struct SharedOutput {
    pin: &'static SharedPin,
}

impl SharedOutput {
    /// Create a handle
    pub fn new(pin: &'static SharedPin) -> Self {
        Self { pin }
    }
}

impl OutputPin for SharedOutput {
    fn set_level(&mut self, high: bool) {
        self.pin.lock(|pin| pin.borrow_mut().set_level(Level::from(high)));
    }

    fn is_set_high(&self) -> bool {
        self.pin.lock(|pin| pin.borrow().is_set_high())
    }
}

/// Input pin that may be read by several sensors
///
/// Two channels can share one stand contact, so the input is borrowed.
#[derive(Clone, Copy)]
pub struct RpInput {
    pin: &'static Input<'static>,
}

impl RpInput {
    /// Wrap an input
    pub fn new(pin: &'static Input<'static>) -> Self {
        Self { pin }
    }
}

impl InputPin for RpInput {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
