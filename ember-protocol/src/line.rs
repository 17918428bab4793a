//! Command line framing and splitting
//!
//! [`LineBuffer`] collects bytes from a serial port until a terminator,
//! [`CommandLine::parse`] splits a complete line into its three fields.

use heapless::String;

/// Maximum accepted line length in bytes, terminator excluded
pub const MAX_LINE_LENGTH: usize = 64;

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Errors from line framing or splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Missing one of the two `:` separators
    Malformed,
    /// Channel field is not a number or names no channel
    InvalidChannel,
    /// Command name not in the registry
    UnknownCommand,
    /// Line longer than [`MAX_LINE_LENGTH`]
    TooLong,
}

impl LineError {
    /// Human readable reply text
    pub fn message(&self) -> &'static str {
        match self {
            LineError::Malformed => "Malformed command. Format: id:command:value_or_?",
            LineError::InvalidChannel => "Invalid device ID",
            LineError::UnknownCommand => "Unknown command",
            LineError::TooLong => "Line too long",
        }
    }
}

/// Value field of a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument<'a> {
    /// `?`: read the current value
    Query,
    /// Anything else: a set request carrying the raw text
    Value(&'a str),
}

impl<'a> Argument<'a> {
    fn from_field(field: &'a str) -> Self {
        if field == "?" {
            Argument::Query
        } else {
            Argument::Value(field)
        }
    }
}

/// A split `id:command:value` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Channel index
    pub channel: usize,
    /// Command name, not yet resolved
    pub command: &'a str,
    /// Query or set value
    pub argument: Argument<'a>,
}

impl<'a> CommandLine<'a> {
    /// Split a line into channel, command and argument
    ///
    /// The value field is everything after the second `:`, so it may itself
    /// contain separators. The channel index is range checked by the caller.
    pub fn parse(line: &'a str) -> Result<Self, LineError> {
        let (id, rest) = line.split_once(':').ok_or(LineError::Malformed)?;
        let (command, value) = rest.split_once(':').ok_or(LineError::Malformed)?;

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LineError::InvalidChannel);
        }
        let channel = id.parse().map_err(|_| LineError::InvalidChannel)?;

        Ok(Self {
            channel,
            command,
            argument: Argument::from_field(value),
        })
    }
}

/// Accumulates serial bytes into complete lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: String<MAX_LINE_LENGTH>,
    overflowed: bool,
    complete: bool,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            overflowed: false,
            complete: false,
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
        self.complete = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a line,
    /// `Ok(None)` while more bytes are needed. The returned line stays
    /// valid until the next call. A line that outgrew the buffer is
    /// reported once, at its terminator. Carriage returns and non-ASCII
    /// bytes are dropped, and blank lines are skipped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<&str>, LineError> {
        if self.complete {
            self.reset();
        }

        if byte == LINE_TERMINATOR {
            if self.overflowed {
                self.reset();
                return Err(LineError::TooLong);
            }
            if self.buffer.is_empty() {
                return Ok(None);
            }
            self.complete = true;
            return Ok(Some(self.buffer.as_str()));
        }

        if byte == b'\r' || !byte.is_ascii() {
            return Ok(None);
        }

        if self.buffer.push(byte as char).is_err() {
            self.overflowed = true;
        }
        Ok(None)
    }
}
