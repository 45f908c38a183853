//! DEA / NDEA validation pipeline.

use std::sync::OnceLock;

use super::Pipeline;
use crate::checksum::dea;
use crate::credential::{surname_initial, DeaNumber, RegistrantClass};
use crate::error::ValidationError;
use crate::outcome::Outcome;

/// The shared DEA pipeline.
pub fn pipeline() -> &'static Pipeline<'static> {
    static PIPELINE: OnceLock<Pipeline<'static>> = OnceLock::new();
    PIPELINE.get_or_init(|| {
        Pipeline::new()
            .non_empty()
            .exact_length(DeaNumber::LEN)
            .ensure_with(
                |s| s.chars().next().and_then(RegistrantClass::from_letter).is_some(),
                |s| {
                    ValidationError::format(format!(
                        "unknown registrant letter {:?}",
                        s.chars().next().unwrap_or_default()
                    ))
                },
            )
            .ensure_with(
                |s| s.chars().nth(1).is_some_and(|c| c.is_ascii_uppercase()),
                |s| {
                    ValidationError::format(format!(
                        "second character must be an upper-case surname initial, got {:?}",
                        s.chars().nth(1).unwrap_or_default()
                    ))
                },
            )
            .ensure(
                |s| s.chars().skip(2).all(|c| c.is_ascii_digit()),
                ValidationError::NonNumeric,
            )
            .ensure(
                |s| s.get(2..).is_some_and(|digits| dea::verify(digits).is_ok()),
                ValidationError::ChecksumFailed,
            )
    })
}

/// Validate a DEA or NDEA registration number.
///
/// # Errors
///
/// The first violated condition, in pipeline order.
pub fn validate(input: &str) -> Result<DeaNumber, ValidationError> {
    pipeline().run(input).map(|s| DeaNumber(s.to_string()))
}

/// Validate a DEA number and check its initial against the registrant's surname.
///
/// # Errors
///
/// Any error of [`validate`], then `FormatMismatch` if the initial differs
/// from [`surname_initial`] of `last_name`.
pub fn validate_for_surname(input: &str, last_name: &str) -> Result<DeaNumber, ValidationError> {
    let expected = surname_initial(last_name);
    validate(input).ensure_with(
        |dea| dea.initial() == expected,
        |dea| {
            ValidationError::format(format!(
                "initial {:?} does not match surname {:?}",
                dea.initial(),
                last_name.trim()
            ))
        },
    )
}
