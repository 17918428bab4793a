//! Heartbeat LED
//!
//! Lights the LED for a fixed pulse after every zero-cross edge, so a
//! steady glow means mains sync is present. An edge during the pulse
//! restarts it.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use ember_hal::OutputPin;
use ember_hal_rp2040::RpOutput;

use crate::board::{HEARTBEAT_INVERTED, HEARTBEAT_PULSE_US};
use crate::channels::HEARTBEAT;

/// Heartbeat task - pulses the LED on zero-cross edges
#[embassy_executor::task]
pub async fn heartbeat_task(mut led: RpOutput) {
    info!("Heartbeat task started");

    let pulse = Duration::from_micros(HEARTBEAT_PULSE_US);
    led.set_level(HEARTBEAT_INVERTED);

    loop {
        HEARTBEAT.wait().await;
        led.set_level(!HEARTBEAT_INVERTED);

        while let Either::Second(()) = select(Timer::after(pulse), HEARTBEAT.wait()).await {}

        led.set_level(HEARTBEAT_INVERTED);
    }
}
