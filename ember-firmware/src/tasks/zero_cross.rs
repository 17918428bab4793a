//! Zero-cross task
//!
//! Runs on the high-priority interrupt executor. Every mains zero cross
//! advances the burst-fire window and fires or blanks each heater; the
//! last edge of the window blanks all heaters and requests a sample.

use defmt::*;
use embassy_rp::gpio::Input;
use ember_core::scheduler::{Edge, OutputStage};
use ember_hal::Clock;
use ember_hal_rp2040::EmbassyClock;

use crate::board::{Heater, CHANNEL_COUNT, ZERO_CROSS_FALLING};
use crate::channels::HEARTBEAT;

/// Zero-cross task - drives the heater gates from the detector edges
#[embassy_executor::task]
pub async fn zero_cross_task(
    mut detector: Input<'static>,
    mut stage: OutputStage<'static, Heater, CHANNEL_COUNT>,
) {
    info!("Zero-cross task started");

    let clock = EmbassyClock;

    loop {
        if ZERO_CROSS_FALLING {
            detector.wait_for_falling_edge().await;
        } else {
            detector.wait_for_rising_edge().await;
        }

        HEARTBEAT.signal(());

        if let Edge::Sample = stage.on_zero_cross(clock.now_micros()) {
            trace!("Sample window");
        }
    }
}
