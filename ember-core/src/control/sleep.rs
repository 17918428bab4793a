//! Stand-driven sleep state machine
//!
//! ```text
//!            resting                 delay elapsed
//! Active ────────────► DelayPending ───────────────► Sleeping
//!   ▲                       │                           │
//!   └───────── lifted ──────┴────────── lifted ─────────┘
//! ```
//!
//! The machine is only stepped while the channel is enabled; disabling a
//! channel freezes it in its current state.

/// Sleep state of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepState {
    /// Tool in hand, normal setpoint
    #[default]
    Active,
    /// Tool on the stand, waiting for the delay to elapse
    DelayPending,
    /// Sleep setpoint in effect
    Sleeping,
}

/// Sleep state machine
///
/// Rest time is accumulated in 64-bit microseconds from the steps between
/// updates, so delays far beyond the 32-bit clock period still elapse.
/// Updates must come at least once per clock period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SleepMachine {
    state: SleepState,
    rested_us: u64,
    last_us: u32,
}

impl SleepMachine {
    /// Create a machine in the active state
    pub const fn new() -> Self {
        Self {
            state: SleepState::Active,
            rested_us: 0,
            last_us: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> SleepState {
        self.state
    }

    /// True while the sleep setpoint is in effect
    pub fn is_sleeping(&self) -> bool {
        self.state == SleepState::Sleeping
    }

    /// Advance the machine
    ///
    /// # Arguments
    /// - `resting`: stand sensor reading
    /// - `now_us`: current time
    /// - `delay_us`: configured sleep delay
    ///
    /// Returns `true` if the state changed.
    pub fn update(&mut self, resting: bool, now_us: u32, delay_us: u64) -> bool {
        let step = u64::from(now_us.wrapping_sub(self.last_us));
        self.last_us = now_us;

        let next = match (self.state, resting) {
            (_, false) => SleepState::Active,
            (SleepState::Active, true) => {
                self.rested_us = 0;
                SleepState::DelayPending
            }
            (SleepState::DelayPending, true) => {
                self.rested_us = self.rested_us.saturating_add(step);
                if self.rested_us > delay_us {
                    SleepState::Sleeping
                } else {
                    SleepState::DelayPending
                }
            }
            (SleepState::Sleeping, true) => SleepState::Sleeping,
        };

        let changed = next != self.state;
        self.state = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: u64 = 30_000_000;

    #[test]
    fn test_rest_then_sleep() {
        let mut sleep = SleepMachine::new();
        assert!(sleep.update(true, 1_000, DELAY));
        assert_eq!(sleep.state(), SleepState::DelayPending);

        assert!(!sleep.update(true, 1_000 + 30_000_000, DELAY));
        assert!(!sleep.is_sleeping());

        assert!(sleep.update(true, 1_001 + 30_000_000, DELAY));
        assert!(sleep.is_sleeping());

        // Stays asleep while resting
        assert!(!sleep.update(true, 60_000_000, DELAY));
        assert!(sleep.is_sleeping());
    }

    #[test]
    fn test_lift_cancels_pending_delay() {
        let mut sleep = SleepMachine::new();
        sleep.update(true, 0, DELAY);
        assert!(sleep.update(false, 10, DELAY));
        assert_eq!(sleep.state(), SleepState::Active);

        // Timer restarts from the new rest
        sleep.update(true, 30_000_000, DELAY);
        sleep.update(true, 45_000_000, DELAY);
        assert!(!sleep.is_sleeping());
    }

    #[test]
    fn test_lift_wakes() {
        let mut sleep = SleepMachine::new();
        sleep.update(true, 0, 0);
        sleep.update(true, 1, 0);
        assert!(sleep.is_sleeping());
        assert!(sleep.update(false, 2, 0));
        assert_eq!(sleep.state(), SleepState::Active);
    }

    #[test]
    fn test_delay_across_timer_wrap() {
        let mut sleep = SleepMachine::new();
        let start = u32::MAX - 100;
        sleep.update(true, start, 1_000);
        sleep.update(true, start.wrapping_add(500), 1_000);
        assert!(!sleep.is_sleeping());
        sleep.update(true, start.wrapping_add(1_001), 1_000);
        assert!(sleep.is_sleeping());
    }

    #[test]
    fn test_delay_longer_than_clock_period() {
        // 5000 s is beyond the 71 minute wrap of the µs clock
        let delay = 5_000_000_000;
        let mut sleep = SleepMachine::new();
        let mut now = u32::MAX - 10;
        sleep.update(true, now, delay);
        for _ in 0..5_000 {
            now = now.wrapping_add(1_000_000);
            sleep.update(true, now, delay);
        }
        assert_eq!(sleep.state(), SleepState::DelayPending);

        now = now.wrapping_add(1_000_000);
        assert!(sleep.update(true, now, delay));
        assert!(sleep.is_sleeping());
    }
}
