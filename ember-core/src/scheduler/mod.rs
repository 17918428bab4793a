//! Zero-cross burst-fire scheduling
//!
//! The zero-cross interrupt and the main loop share a [`ChannelLink`] per
//! channel. The interrupt side only touches atomics and heater pins.

pub mod link;
pub mod zero_cross;

pub use link::ChannelLink;
pub use zero_cross::{Edge, FiringOutput, OutputStage, ZeroCrossScheduler};
