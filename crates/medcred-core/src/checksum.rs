//! # Checksum Algorithms
//!
//! Pure, total functions computing and verifying check digits:
//!
//! - [`luhn`]: positional doubling checksum used by NPIs (with the
//!   `80840` issuer prefix) and by license templates that declare one.
//! - [`dea`]: the DEA weighted-sum checksum over a 6-digit body.
//!
//! Both reject empty, wrong-length and non-numeric input with a typed
//! [`ValidationError`] before doing any arithmetic.

pub mod dea;
pub mod luhn;

use crate::error::ValidationError;
use crate::outcome::Outcome;

/// Decode an ASCII digit string into digit values.
///
/// # Errors
///
/// [`ValidationError::EmptyInput`] for an empty string,
/// [`ValidationError::NonNumeric`] if any character is not `0-9`.
pub fn parse_digits(s: &str) -> Result<Vec<u8>, ValidationError> {
    Ok(s)
        .ensure(|s| !s.is_empty(), ValidationError::EmptyInput)
        .ensure(|s| s.bytes().all(|b| b.is_ascii_digit()), ValidationError::NonNumeric)
        .map(|s| s.bytes().map(|b| b - b'0').collect())
}

/// Render a digit value as its ASCII character.
pub(crate) fn digit_char(d: u8) -> char {
    char::from(b'0' + d % 10)
}
