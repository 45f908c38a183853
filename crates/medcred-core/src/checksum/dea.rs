//! DEA weighted-sum check digit.
//!
//! For a body `d1..d6`: `odd = d1 + d3 + d5`, `even = 2 * (d2 + d4 + d6)`,
//! check digit = `(odd + even) mod 10`.

use super::{digit_char, parse_digits};
use crate::error::ValidationError;
use crate::outcome::Outcome;

/// Number of body digits covered by the checksum.
pub const BODY_LEN: usize = 6;

/// Compute the check digit of a 6-digit body.
///
/// # Errors
///
/// `EmptyInput`, `WrongLength` (not 6 characters) or `NonNumeric`.
pub fn check_digit(body: &str) -> Result<u8, ValidationError> {
    parse_body(body).map(|[d1, d2, d3, d4, d5, d6]| {
        let odd = d1 + d3 + d5;
        let even = 2 * (d2 + d4 + d6);
        (odd + even) % 10
    })
}

/// Check digit as its ASCII character.
///
/// # Errors
///
/// Same as [`check_digit`].
pub fn check_char(body: &str) -> Result<char, ValidationError> {
    check_digit(body).map(digit_char)
}

/// Verify seven digits: a 6-digit body followed by its check digit.
///
/// # Errors
///
/// `ChecksumFailed` on mismatch; `EmptyInput`/`WrongLength`/`NonNumeric`
/// for malformed input.
pub fn verify(digits: &str) -> Result<(), ValidationError> {
    let (body, check) = Ok(digits)
        .ensure(|s| !s.is_empty(), ValidationError::EmptyInput)
        .ensure_with(
            |s| s.chars().count() == BODY_LEN + 1,
            |s| ValidationError::WrongLength {
                expected: BODY_LEN + 1,
                actual: s.chars().count(),
            },
        )
        .ensure(|s| s.bytes().all(|b| b.is_ascii_digit()), ValidationError::NonNumeric)
        .map(|s| s.split_at(BODY_LEN))?;
    check_char(body)
        .ensure(|expected| check.starts_with(*expected), ValidationError::ChecksumFailed)
        .map(|_| ())
}

fn parse_body(body: &str) -> Result<[u8; BODY_LEN], ValidationError> {
    let actual = body.chars().count();
    Ok(body)
        .ensure(|s| !s.is_empty(), ValidationError::EmptyInput)
        .ensure(
            |_| actual == BODY_LEN,
            ValidationError::WrongLength {
                expected: BODY_LEN,
                actual,
            },
        )
        .and_then(parse_digits)
        .and_then(|digits| {
            <[u8; BODY_LEN]>::try_from(digits).map_err(|d| ValidationError::WrongLength {
                expected: BODY_LEN,
                actual: d.len(),
            })
        })
}
