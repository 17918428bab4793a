//! Burst-fire scheduler
//!
//! A window of `N` half-cycles is followed by one sampling edge:
//!
//! ```text
//! edge:    0    1    2   ...  N-1   N      0    1
//! phase:   0   1/N  2/N     (N-1)/N  -     0   1/N
//! action:  fire if phase < ratio   sample  fire ...
//! ```
//!
//! With ratio `r`, the edges whose phase is below `r` fire, so the on
//! half-cycles sit at the start of the window and the heater is already
//! off when the sampling edge arrives.

use crate::scheduler::link::ChannelLink;
use crate::traits::HeaterOutput;

/// What to do on one zero-cross edge
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Window complete: turn heaters off and request a sample
    Sample,
    /// Inside the window at the given phase in `[0, 1)`
    Fire {
        /// Position in the window
        phase: f32,
    },
}

/// Window position counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCrossScheduler {
    period: u8,
    counter: u8,
}

impl ZeroCrossScheduler {
    /// Create a scheduler with `period` firing edges per window
    ///
    /// A period of zero is treated as one.
    pub const fn new(period: u8) -> Self {
        Self {
            period: if period == 0 { 1 } else { period },
            counter: 0,
        }
    }

    /// Firing edges per window
    pub fn period(&self) -> u8 {
        self.period
    }

    /// Advance by one edge
    pub fn on_edge(&mut self) -> Edge {
        if self.counter >= self.period {
            self.counter = 0;
            return Edge::Sample;
        }

        let phase = f32::from(self.counter) / f32::from(self.period);
        self.counter += 1;
        Edge::Fire { phase }
    }
}

/// A heater output bound to its channel link
pub struct FiringOutput<'a, H> {
    /// Shared channel state
    pub link: &'a ChannelLink,
    /// Heater gate
    pub heater: H,
}

impl<'a, H: HeaterOutput> FiringOutput<'a, H> {
    /// Bind a heater to a link
    pub fn new(link: &'a ChannelLink, heater: H) -> Self {
        Self { link, heater }
    }

    fn apply(&mut self, edge: Edge, now_us: u32) {
        match edge {
            Edge::Sample => {
                self.heater.set_on(false);
                self.link.schedule_sample(now_us);
            }
            Edge::Fire { phase } => {
                let on = self.link.is_enabled()
                    && !self.link.is_sample_due()
                    && phase < self.link.output();
                self.heater.set_on(on);
            }
        }
    }
}

/// Interrupt-side driver for all channels
///
/// Owns the window counter and one [`FiringOutput`] per channel. Call
/// [`on_zero_cross`](Self::on_zero_cross) from the zero-cross edge
/// handler; it is bounded and never blocks.
pub struct OutputStage<'a, H, const N: usize> {
    scheduler: ZeroCrossScheduler,
    outputs: [FiringOutput<'a, H>; N],
}

impl<'a, H: HeaterOutput, const N: usize> OutputStage<'a, H, N> {
    /// Create the stage
    pub fn new(period: u8, outputs: [FiringOutput<'a, H>; N]) -> Self {
        Self {
            scheduler: ZeroCrossScheduler::new(period),
            outputs,
        }
    }

    /// Handle one zero-cross edge
    pub fn on_zero_cross(&mut self, now_us: u32) -> Edge {
        let edge = self.scheduler.on_edge();
        for output in self.outputs.iter_mut() {
            output.apply(edge, now_us);
        }
        edge
    }

    /// Access a channel's heater
    pub fn heater(&self, index: usize) -> Option<&H> {
        self.outputs.get(index).map(|o| &o.heater)
    }
}
