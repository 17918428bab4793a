//! Microsecond clock on the embassy time driver

use embassy_time::Instant;
use ember_hal::Clock;

/// Free-running clock, truncated to 32 bits
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_micros(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}
