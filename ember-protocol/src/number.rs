//! Number grammar for command values
//!
//! Values are plain decimals: an optional sign, up to ten integer digits,
//! an optional dot and up to ten fractional digits. Exponents, whitespace,
//! `inf` and `nan` are rejected, so a setter can never be fed a non-finite
//! value through the protocol.

/// Maximum digits on either side of the decimal point
pub const MAX_DIGITS: usize = 10;

/// Errors from number parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumberError {
    /// Character outside the decimal grammar
    Syntax,
    /// More than [`MAX_DIGITS`] digits before or after the dot
    TooManyDigits,
}

/// Parse a decimal number
///
/// Digits are accumulated in single precision, integer part first and the
/// fraction scaled by successive tenths, which is the rounding behaviour the
/// stored calibration values were entered with.
pub fn parse_decimal(input: &str) -> Result<f32, NumberError> {
    let bytes = input.as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    match digits.first() {
        Some(c) if c.is_ascii_digit() || *c == b'.' => {}
        _ => return Err(NumberError::Syntax),
    }

    let mut integer = 0.0f32;
    let mut fraction = 0.0f32;
    let mut factor = 0.1f32;
    let mut integer_digits = 0;
    let mut fraction_digits = 0;
    let mut seen_dot = false;

    for &c in digits {
        if c == b'.' {
            if seen_dot {
                return Err(NumberError::Syntax);
            }
            seen_dot = true;
            continue;
        }

        if !c.is_ascii_digit() {
            return Err(NumberError::Syntax);
        }
        let digit = f32::from(c - b'0');

        if seen_dot {
            if fraction_digits >= MAX_DIGITS {
                return Err(NumberError::TooManyDigits);
            }
            fraction += digit * factor;
            factor *= 0.1;
            fraction_digits += 1;
        } else {
            if integer_digits >= MAX_DIGITS {
                return Err(NumberError::TooManyDigits);
            }
            integer = integer * 10.0 + digit;
            integer_digits += 1;
        }
    }

    let value = integer + fraction;
    Ok(if negative { -value } else { value })
}

/// Parse a `0`/`1` flag
pub fn parse_flag(input: &str) -> Result<bool, NumberError> {
    match input {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(NumberError::Syntax),
    }
}
