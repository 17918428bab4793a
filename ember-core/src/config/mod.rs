//! Configuration types
//!
//! Board constants, the persisted per-channel configuration and the
//! declared storage layout that maps it to non-volatile memory.

pub mod channel;
pub mod hardware;
pub mod layout;

pub use channel::ChannelConfig;
pub use hardware::*;
pub use layout::{Field, Slot, FOOTPRINT};
