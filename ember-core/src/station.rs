//! Station context
//!
//! Owns every heater channel and the configuration store, and routes
//! protocol lines to the addressed channel:
//!
//! ```text
//!   "1:set_t:300"
//!        │
//!        ▼
//! ┌──────────────┐   channel 1   ┌─────────────┐   save   ┌───────┐
//! │ CommandLine  │ ────────────► │   execute   │ ───────► │ store │
//! └──────────────┘               └─────────────┘          └───────┘
//! ```

use ember_protocol::{CommandKind, CommandLine, LineError, Reply};

use crate::channel::{Channel, ChannelEvent, ChannelStatus};
use crate::command;
use crate::error::Error;
use crate::traits::{HeaterOutput, PersistentStore, StandSensor, StoreError, ThermocoupleInput};

/// All channels of one controller plus their shared store
pub struct Station<'a, T, S, H, P, const N: usize> {
    channels: [Channel<'a, T, S, H>; N],
    store: P,
}

impl<'a, T, S, H, P, const N: usize> Station<'a, T, S, H, P, N>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
    P: PersistentStore,
{
    /// Create a station from its channels and store
    pub fn new(channels: [Channel<'a, T, S, H>; N], store: P) -> Self {
        Self { channels, store }
    }

    /// Load every channel's configuration
    ///
    /// Returns one result per channel; a failed channel keeps whatever part
    /// of its record could be read.
    pub fn init(&mut self) -> [Result<(), StoreError>; N] {
        core::array::from_fn(|i| self.channels[i].init(&mut self.store))
    }

    /// Run the main-loop duties of every channel
    pub fn update(&mut self, now_us: u32) -> [Option<ChannelEvent>; N] {
        core::array::from_fn(|i| self.channels[i].update(now_us))
    }

    /// Evaluate one `id:command:value` line
    pub fn eval_line(&mut self, line: &str) -> Result<Reply, Error> {
        let request = CommandLine::parse(line)?;
        let channel = self
            .channels
            .get_mut(request.channel)
            .ok_or(LineError::InvalidChannel)?;
        let kind = CommandKind::from_name(request.command).ok_or(LineError::UnknownCommand)?;

        command::execute(channel, kind, request.argument, &mut self.store)
    }

    /// Status snapshot of every channel
    pub fn statuses(&self) -> [ChannelStatus; N] {
        core::array::from_fn(|i| self.channels[i].status())
    }

    /// Channel by index
    pub fn channel(&self, index: usize) -> Option<&Channel<'a, T, S, H>> {
        self.channels.get(index)
    }

    /// Mutable channel by index
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel<'a, T, S, H>> {
        self.channels.get_mut(index)
    }

    /// Configuration store
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Mutable configuration store
    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }
}
