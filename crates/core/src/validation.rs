//! Input validation utilities.
//!
//! Checks applied to operator input before it reaches a store. Each function
//! either returns the parsed value or `HmsError::InvalidInput` with a message
//! suitable for showing back at the prompt.

use crate::constants::DATE_FORMAT;
use crate::{HmsError, HmsResult};
use chrono::NaiveDate;

/// Validates a supply batch number: exactly four ASCII digits.
pub fn validate_batch_number(input: &str) -> HmsResult<&str> {
    let input = input.trim();
    if input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(input);
    }
    Err(HmsError::InvalidInput(
        "batch number must be a 4-digit number (e.g. 1023)".into(),
    ))
}

/// Parses a calendar date written strictly as `YYYY-MM-DD`.
///
/// Shape is checked before parsing because chrono accepts unpadded fields.
pub fn parse_date(input: &str) -> HmsResult<NaiveDate> {
    let input = input.trim();
    let shape_ok = input.len() == 10
        && input.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(HmsError::InvalidInput(
            "invalid date format, use YYYY-MM-DD".into(),
        ));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| HmsError::InvalidInput(format!("'{input}' is not a calendar date")))
}

/// Parses an expiry date that must fall strictly after `today`.
pub fn parse_future_date(input: &str, today: NaiveDate) -> HmsResult<NaiveDate> {
    let date = parse_date(input)?;
    if date <= today {
        return Err(HmsError::InvalidInput(
            "expiry date must be in the future".into(),
        ));
    }
    Ok(date)
}

/// Parses a strictly positive whole number (quantities, hours).
pub fn parse_positive(input: &str, what: &str) -> HmsResult<u32> {
    match input.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(HmsError::InvalidInput(format!(
            "{what} must be a positive number"
        ))),
    }
}

/// Parses a strictly positive measurement such as height or weight.
pub fn parse_measurement(input: &str, what: &str) -> HmsResult<f64> {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(HmsError::InvalidInput(format!(
            "{what} must be a positive number"
        ))),
    }
}
