//! Calibration point encoding
//!
//! A single table point is read with its index (`3`) and written with its
//! index and both coordinates (`3[100.00,25.00]`, voltage first).

use core::fmt::Write;

use crate::format::Reply;
use crate::number::parse_decimal;

/// Errors from calibration point requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Index is not a number or outside the table
    InvalidIndex,
    /// Brackets or comma missing or misplaced
    Format,
    /// A coordinate failed to parse
    InvalidNumber,
}

impl CalibrationError {
    /// Human readable reply text
    pub fn message(&self) -> &'static str {
        match self {
            CalibrationError::InvalidIndex => "Invalid index",
            CalibrationError::Format => "Format must be index[x,y]",
            CalibrationError::InvalidNumber => "Invalid float value",
        }
    }
}

/// A decoded calibration point request
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationRequest {
    /// Read one point
    Get(usize),
    /// Replace one point
    Set {
        /// Table index
        index: usize,
        /// Thermocouple voltage in µV
        voltage: f32,
        /// Temperature in °C
        temperature: f32,
    },
}

impl CalibrationRequest {
    /// Decode a request against a table of `size` points
    pub fn parse(value: &str, size: usize) -> Result<Self, CalibrationError> {
        let is_write = value.bytes().any(|b| matches!(b, b'[' | b',' | b']'));
        if !is_write {
            return parse_index(value, size).map(CalibrationRequest::Get);
        }

        let open = value.find('[').ok_or(CalibrationError::Format)?;
        let comma = value[open..]
            .find(',')
            .map(|i| open + i)
            .ok_or(CalibrationError::Format)?;
        let close = value[comma..]
            .find(']')
            .map(|i| comma + i)
            .ok_or(CalibrationError::Format)?;
        if close + 1 != value.len() {
            return Err(CalibrationError::Format);
        }

        let index = parse_index(&value[..open], size)?;
        let voltage =
            parse_decimal(&value[open + 1..comma]).map_err(|_| CalibrationError::InvalidNumber)?;
        let temperature =
            parse_decimal(&value[comma + 1..close]).map_err(|_| CalibrationError::InvalidNumber)?;

        Ok(CalibrationRequest::Set {
            index,
            voltage,
            temperature,
        })
    }
}

fn parse_index(text: &str, size: usize) -> Result<usize, CalibrationError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalibrationError::InvalidIndex);
    }
    match text.parse::<usize>() {
        Ok(index) if index < size => Ok(index),
        _ => Err(CalibrationError::InvalidIndex),
    }
}

/// Format a point as `[voltage,temperature]` with two decimals
pub fn format_point(voltage: f32, temperature: f32) -> Reply {
    let mut reply = Reply::new();
    // Two maximal f32 values with two decimals fit in the reply buffer.
    let _ = write!(reply, "[{:.2},{:.2}]", voltage, temperature);
    reply
}
