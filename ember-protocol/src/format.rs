//! Reply formatting
//!
//! Numeric replies use a fixed number of decimals per command, e.g. a
//! temperature setpoint is reported as `300.00` and a thermocouple
//! voltage as `12000.00000`.

use core::fmt::Write;

/// Reply buffer capacity in bytes
///
/// Large enough for a calibration point with two maximal `f32` values.
pub const REPLY_CAPACITY: usize = 96;

/// One protocol reply line, without terminator
pub type Reply = heapless::String<REPLY_CAPACITY>;

/// Format a value with a fixed number of decimals
pub fn fixed(value: f32, decimals: usize) -> Reply {
    let mut reply = Reply::new();
    // An f32 never exceeds 39 integer digits, so this cannot overflow.
    let _ = write!(reply, "{:.*}", decimals, value);
    reply
}

/// Reply with a static text, truncated to the buffer capacity
pub fn text(message: &str) -> Reply {
    let mut reply = Reply::new();
    for c in message.chars() {
        if reply.push(c).is_err() {
            break;
        }
    }
    reply
}

/// Reply with a `0`/`1` flag
pub fn flag(value: bool) -> Reply {
    text(if value { "1" } else { "0" })
}

/// Reply with an unsigned count
pub fn count(value: usize) -> Reply {
    let mut reply = Reply::new();
    let _ = write!(reply, "{}", value);
    reply
}
