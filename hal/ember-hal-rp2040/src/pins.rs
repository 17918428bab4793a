//! Board pins by number
//!
//! Pin numbers come from the board configuration, which the firmware build
//! script turns into `take_pin!(p, N)` invocations with literal numbers.
//! Only general-purpose pins are covered: the console UART (GPIO 0/1), the
//! EEPROM bus (GPIO 4/5), GPIO 23/24 and the ADC inputs (GPIO 26-29) keep
//! their fixed functions.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

/// Take GPIO `N` from the peripherals as `Peri<'static, AnyPin>`
///
/// Usage:
/// ```ignore
/// let heater = take_pin!(p, 6);
/// ```
#[macro_export]
macro_rules! take_pin {
    ($p:expr, 2) => { $crate::pins::any($p.PIN_2) };
    ($p:expr, 3) => { $crate::pins::any($p.PIN_3) };
    ($p:expr, 6) => { $crate::pins::any($p.PIN_6) };
    ($p:expr, 7) => { $crate::pins::any($p.PIN_7) };
    ($p:expr, 8) => { $crate::pins::any($p.PIN_8) };
    ($p:expr, 9) => { $crate::pins::any($p.PIN_9) };
    ($p:expr, 10) => { $crate::pins::any($p.PIN_10) };
    ($p:expr, 11) => { $crate::pins::any($p.PIN_11) };
    ($p:expr, 12) => { $crate::pins::any($p.PIN_12) };
    ($p:expr, 13) => { $crate::pins::any($p.PIN_13) };
    ($p:expr, 14) => { $crate::pins::any($p.PIN_14) };
    ($p:expr, 15) => { $crate::pins::any($p.PIN_15) };
    ($p:expr, 16) => { $crate::pins::any($p.PIN_16) };
    ($p:expr, 17) => { $crate::pins::any($p.PIN_17) };
    ($p:expr, 18) => { $crate::pins::any($p.PIN_18) };
    ($p:expr, 19) => { $crate::pins::any($p.PIN_19) };
    ($p:expr, 20) => { $crate::pins::any($p.PIN_20) };
    ($p:expr, 21) => { $crate::pins::any($p.PIN_21) };
    ($p:expr, 22) => { $crate::pins::any($p.PIN_22) };
    ($p:expr, 25) => { $crate::pins::any($p.PIN_25) };
}

/// Erase a pin's type
pub fn any<P>(pin: Peri<'static, P>) -> Peri<'static, AnyPin>
where
    Peri<'static, AnyPin>: From<Peri<'static, P>>,
{
    pin.into()
}
