//! State license validation.
//!
//! Unlike NPI and DEA numbers there is no single license format, so the
//! pipeline is assembled from the [`LicenseTemplate`] that governs the
//! `(state, license type)` pair, falling back to the generic template for
//! states without a registered one.

use super::Pipeline;
use crate::checksum::luhn;
use crate::credential::{LicenseNumber, LicenseScope};
use crate::error::ValidationError;
use crate::jurisdiction::{
    template_for, LicenseCheck, LicensePrefix, LicenseTemplate, LicenseType, StateCode,
};

/// Build the pipeline for one template.
pub fn pipeline(template: &'static LicenseTemplate) -> Pipeline<'static> {
    let pipeline = Pipeline::new()
        .non_empty()
        .exact_length(template.total_len());
    let pipeline = match template.prefix {
        LicensePrefix::Literal("") => pipeline,
        LicensePrefix::Literal(prefix) => pipeline.ensure_with(
            move |s| s.starts_with(prefix),
            move |_| ValidationError::format(format!("expected prefix {prefix:?}")),
        ),
        LicensePrefix::SurnameInitial => pipeline.ensure(
            |s| s.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
            ValidationError::format("expected an upper-case surname initial"),
        ),
    };
    let pipeline = pipeline.ensure(
        move |s| numeric_tail(template, s).is_some_and(|tail| tail.bytes().all(|b| b.is_ascii_digit())),
        ValidationError::NonNumeric,
    );
    match template.check {
        LicenseCheck::None => pipeline,
        LicenseCheck::Luhn => pipeline.ensure(
            move |s| numeric_tail(template, s).is_some_and(|tail| luhn::verify(tail).is_ok()),
            ValidationError::ChecksumFailed,
        ),
    }
}

/// Validate a license number for `(state, license_type)`.
///
/// # Errors
///
/// The first violated condition, in pipeline order.
pub fn validate(
    state: StateCode,
    license_type: LicenseType,
    input: &str,
) -> Result<LicenseNumber, ValidationError> {
    let template = template_for(&state, license_type);
    pipeline(template).run(input).map(|s| LicenseNumber {
        scope: LicenseScope {
            state_code: state,
            license_type,
        },
        value: s.to_string(),
    })
}

fn numeric_tail<'s>(template: &LicenseTemplate, s: &'s str) -> Option<&'s str> {
    s.get(template.prefix_len()..)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(code: &str) -> StateCode {
        StateCode::new(code).unwrap()
    }

    fn luhn_number(prefix: &str, payload: &str) -> String {
        let check = luhn::check_char_with_prefix("", payload).unwrap();
        format!("{prefix}{payload}{check}")
    }

    #[test]
    fn florida_medical() {
        let license = validate(state("FL"), LicenseType::Medical, "ME123456").unwrap();
        assert_eq!(license.as_str(), "ME123456");
        assert_eq!(license.state().as_str(), "FL");
        assert_eq!(license.license_type(), LicenseType::Medical);
    }

    #[test]
    fn wrong_prefix_is_format_mismatch() {
        assert_eq!(
            validate(state("FL"), LicenseType::Medical, "MD123456"),
            Err(ValidationError::format("expected prefix \"ME\""))
        );
    }

    #[test]
    fn length_checked_before_prefix() {
        assert_eq!(
            validate(state("FL"), LicenseType::Medical, "X1"),
            Err(ValidationError::WrongLength { expected: 8, actual: 2 })
        );
        assert_eq!(
            validate(state("FL"), LicenseType::Medical, "ME12345"),
            Err(ValidationError::WrongLength { expected: 8, actual: 7 })
        );
    }

    #[test]
    fn non_numeric_tail() {
        assert_eq!(
            validate(state("FL"), LicenseType::Medical, "ME12345X"),
            Err(ValidationError::NonNumeric)
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            validate(state("NY"), LicenseType::Medical, ""),
            Err(ValidationError::EmptyInput)
        );
    }

    #[test]
    fn empty_prefix_template() {
        assert!(validate(state("NY"), LicenseType::Pharmacy, "123456").is_ok());
        assert_eq!(
            validate(state("NY"), LicenseType::Pharmacy, "12345A"),
            Err(ValidationError::NonNumeric)
        );
    }

    #[test]
    fn surname_initial_prefix() {
        assert!(validate(state("TX"), LicenseType::Medical, "S1234").is_ok());
        assert!(matches!(
            validate(state("TX"), LicenseType::Medical, "s1234"),
            Err(ValidationError::FormatMismatch(_))
        ));
        assert!(matches!(
            validate(state("TX"), LicenseType::Medical, "91234"),
            Err(ValidationError::FormatMismatch(_))
        ));
    }

    #[test]
    fn luhn_template_checks_digit() {
        let good = luhn_number("MD", "1234567");
        assert!(validate(state("WA"), LicenseType::Medical, &good).is_ok());

        let mut bad = good.clone();
        let last = bad.pop().unwrap();
        bad.push(if last == '0' { '1' } else { '0' });
        assert_eq!(
            validate(state("WA"), LicenseType::Medical, &bad),
            Err(ValidationError::ChecksumFailed)
        );
    }

    #[test]
    fn luhn_template_without_prefix() {
        let good = luhn_number("", "40517");
        assert!(validate(state("MA"), LicenseType::Medical, &good).is_ok());
    }

    #[test]
    fn unregistered_state_uses_fallback() {
        assert!(validate(state("OH"), LicenseType::Medical, "MD1234567").is_ok());
        assert!(validate(state("OH"), LicenseType::Pharmacy, "RPH1234567").is_ok());
        assert!(matches!(
            validate(state("OH"), LicenseType::Pharmacy, "MDX1234567"),
            Err(ValidationError::FormatMismatch(_))
        ));
        // MA has no pharmacy template.
        assert!(validate(state("MA"), LicenseType::Pharmacy, "RPH7654321").is_ok());
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert!(validate(state("TX"), LicenseType::Medical, "Sé123").is_err());
        assert!(validate(state("NY"), LicenseType::Medical, "ééééé1").is_err());
    }
}
