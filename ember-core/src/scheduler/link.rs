//! Interrupt/main-loop handoff for one channel
//!
//! Single writer per field:
//!
//! | Field          | Writer    | Reader    |
//! |----------------|-----------|-----------|
//! | enabled        | main      | interrupt |
//! | output ratio   | main      | interrupt |
//! | sample due     | both      | both      |
//! | scheduled at   | interrupt | main      |
//!
//! The schedule timestamp is stored before the flag is raised with release
//! ordering, so a reader that sees the flag with acquire ordering also
//! sees the matching timestamp.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Shared state between the zero-cross interrupt and a channel
#[derive(Debug)]
pub struct ChannelLink {
    enabled: AtomicBool,
    sample_due: AtomicBool,
    scheduled_at: AtomicU32,
    /// Output ratio as `f32` bits
    output: AtomicU32,
}

impl Default for ChannelLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelLink {
    /// Disabled link with zero output
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            sample_due: AtomicBool::new(false),
            scheduled_at: AtomicU32::new(0),
            output: AtomicU32::new(0),
        }
    }

    /// Enable or disable firing
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Whether firing is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Publish a new output ratio
    pub fn set_output(&self, ratio: f32) {
        self.output.store(ratio.to_bits(), Ordering::Release);
    }

    /// Current output ratio
    pub fn output(&self) -> f32 {
        f32::from_bits(self.output.load(Ordering::Acquire))
    }

    /// Request a sample (interrupt side)
    pub fn schedule_sample(&self, now_us: u32) {
        self.scheduled_at.store(now_us, Ordering::Relaxed);
        self.sample_due.store(true, Ordering::Release);
    }

    /// Time of the pending sample request, if any
    pub fn sample_due(&self) -> Option<u32> {
        if self.sample_due.load(Ordering::Acquire) {
            Some(self.scheduled_at.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Whether a sample request is pending
    pub fn is_sample_due(&self) -> bool {
        self.sample_due.load(Ordering::Acquire)
    }

    /// Acknowledge the pending sample (main side)
    pub fn clear_sample(&self) {
        self.sample_due.store(false, Ordering::Release);
    }
}
