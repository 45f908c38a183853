//! Luhn (mod 10) check digits.
//!
//! Starting from the rightmost payload digit, every second digit is
//! doubled (the rightmost one included) and 9 is subtracted from two-digit
//! products. The check digit is `(10 - sum mod 10) mod 10`.
//!
//! NPIs are computed over the payload prefixed with [`NPI_PREFIX`], the
//! card-issuer prefix assigned to US health identifiers.

use super::{digit_char, parse_digits};
use crate::error::ValidationError;
use crate::outcome::Outcome;

/// Issuer prefix prepended to the first nine NPI digits before the Luhn sum.
pub const NPI_PREFIX: &str = "80840";

/// Compute the Luhn check digit of a numeric payload.
///
/// # Errors
///
/// `EmptyInput` or `NonNumeric` if `payload` is not a digit string.
pub fn check_digit(payload: &str) -> Result<u8, ValidationError> {
    check_digit_with_prefix("", payload)
}

/// Compute the Luhn check digit of `prefix ++ payload`.
///
/// The prefix is a fixed constant and may be empty; the payload must not be.
///
/// # Errors
///
/// `EmptyInput` if `payload` is empty, `NonNumeric` if either part holds a
/// non-digit.
pub fn check_digit_with_prefix(prefix: &str, payload: &str) -> Result<u8, ValidationError> {
    let payload = parse_digits(payload)?;
    let prefix = Ok(prefix)
        .ensure(|p| p.bytes().all(|b| b.is_ascii_digit()), ValidationError::NonNumeric)?
        .bytes()
        .map(|b| b - b'0');
    Ok(compute(prefix.chain(payload)))
}

/// Check digit as its ASCII character.
///
/// # Errors
///
/// Same as [`check_digit_with_prefix`].
pub fn check_char_with_prefix(prefix: &str, payload: &str) -> Result<char, ValidationError> {
    check_digit_with_prefix(prefix, payload).map(digit_char)
}

/// Verify that the last digit of `value` is the Luhn check digit of the rest.
///
/// # Errors
///
/// `ChecksumFailed` on mismatch; `EmptyInput`/`NonNumeric` for malformed input.
pub fn verify(value: &str) -> Result<(), ValidationError> {
    verify_with_prefix("", value)
}

/// Verify `value` whose check digit covers `prefix ++ value[..n-1]`.
///
/// # Errors
///
/// `ChecksumFailed` on mismatch; `EmptyInput`/`NonNumeric` for malformed input.
pub fn verify_with_prefix(prefix: &str, value: &str) -> Result<(), ValidationError> {
    let (payload, check) = split_check(value)?;
    check_char_with_prefix(prefix, payload)
        .ensure(|expected| *expected == check, ValidationError::ChecksumFailed)
        .map(|_| ())
}

fn split_check(value: &str) -> Result<(&str, char), ValidationError> {
    let check = value
        .chars()
        .last()
        .ok_or(ValidationError::EmptyInput)
        .ensure(|c| c.is_ascii_digit(), ValidationError::NonNumeric)?;
    let payload = &value[..value.len() - check.len_utf8()];
    Ok((payload, check))
}

fn compute(digits: impl DoubleEndedIterator<Item = u8>) -> u8 {
    let sum: u32 = digits
        .rev()
        .enumerate()
        .map(|(i, d)| {
            let d = u32::from(d);
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    // Always < 10.
    ((10 - sum % 10) % 10) as u8
}
