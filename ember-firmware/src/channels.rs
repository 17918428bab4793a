//! Inter-task communication channels
//!
//! Defines the static channels and signals shared between Embassy tasks,
//! and the per-channel links shared with the zero-cross task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use ember_core::scheduler::ChannelLink;
use ember_protocol::{Reply, MAX_LINE_LENGTH};

use crate::board::CHANNEL_COUNT;

/// Queued command lines
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Queued console replies
const REPLY_CHANNEL_SIZE: usize = 4;

/// One received command line
pub type CommandText = String<MAX_LINE_LENGTH>;

/// Result of one console line
pub struct Response {
    /// Command succeeded
    pub ok: bool,
    /// Reply or error text, may be empty
    pub text: Reply,
}

/// Command lines from the console to the control task
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, CommandText, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Responses back to the console
pub static REPLY_CHANNEL: Channel<CriticalSectionRawMutex, Response, REPLY_CHANNEL_SIZE> =
    Channel::new();

/// Raised on every zero-cross edge
pub static HEARTBEAT: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Main loop and zero-cross state per channel
pub static LINKS: [ChannelLink; CHANNEL_COUNT] = [const { ChannelLink::new() }; CHANNEL_COUNT];
