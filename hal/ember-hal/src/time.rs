//! Monotonic time source

/// Free-running microsecond clock
///
/// The counter wraps at `u32::MAX` (about 71 minutes). Consumers compare
/// timestamps with `wrapping_sub`, never with `<`.
pub trait Clock {
    /// Current time in microseconds
    fn now_micros(&self) -> u32;

    /// Microseconds elapsed since `earlier`
    fn elapsed_since(&self, earlier: u32) -> u32 {
        self.now_micros().wrapping_sub(earlier)
    }
}

impl<C: Clock> Clock for &C {
    fn now_micros(&self) -> u32 {
        (**self).now_micros()
    }
}
