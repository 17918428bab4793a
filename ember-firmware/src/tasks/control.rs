//! Control task
//!
//! The cooperative main loop: loads every channel from the EEPROM, then
//! repeatedly takes the samples the zero-cross task requested, runs the
//! PID and sleep logic, and executes queued console commands between
//! updates.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use ember_core::{ChannelEvent, Error};
use ember_hal::Clock;
use ember_hal_rp2040::EmbassyClock;
use ember_protocol::format;

use crate::board::BoardStation;
use crate::channels::{Response, COMMAND_CHANNEL, REPLY_CHANNEL};

/// Main loop period
const CONTROL_INTERVAL_US: u64 = 250;

/// Interval between status log lines
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Control task - owns the station
#[embassy_executor::task]
pub async fn control_task(station: &'static mut BoardStation) {
    info!("Control task started");

    for (i, result) in station.init().iter().enumerate() {
        match result {
            Ok(()) => info!("Channel {} configuration loaded", i),
            Err(e) => warn!("Channel {} configuration load failed: {:?}", i, e),
        }
    }

    let clock = EmbassyClock;
    let mut ticker = Ticker::every(Duration::from_micros(CONTROL_INTERVAL_US));
    let mut last_status = Instant::now();

    loop {
        for (i, event) in station.update(clock.now_micros()).iter().enumerate() {
            match event {
                Some(ChannelEvent::Tripped(cause)) => {
                    error!("Channel {} disabled, {}", i, Error::Runaway(*cause).message())
                }
                Some(ChannelEvent::Asleep) => info!("Channel {} asleep", i),
                Some(ChannelEvent::Awake) => info!("Channel {} awake", i),
                None => {}
            }
        }

        while let Ok(line) = COMMAND_CHANNEL.try_receive() {
            let response = match station.eval_line(&line) {
                Ok(reply) => Response {
                    ok: true,
                    text: reply,
                },
                Err(e) => {
                    warn!("Command '{}' failed: {}", line.as_str(), e.message());
                    Response {
                        ok: false,
                        text: format::text(e.message()),
                    }
                }
            };
            REPLY_CHANNEL.send(response).await;
        }

        if last_status.elapsed() >= STATUS_INTERVAL {
            last_status = Instant::now();
            for (i, status) in station.statuses().iter().enumerate() {
                debug!("Channel {}: {}", i, status);
            }
        }

        ticker.next().await;
    }
}
