use medcred_core::checksum::luhn;
use medcred_core::jurisdiction::{template_for, LicenseCheck, LicensePrefix};
use medcred_core::{surname_initial, GenerationError, LicenseNumber, LicenseType, StateCode};
use rand::Rng;

use crate::{expect_len, random_digits};

/// Generate a license number for `(state, license_type)`.
///
/// The template registered for the pair decides the prefix, the number of
/// random digits and whether a Luhn check digit is appended. States with no
/// registered template use the fallback for the license type.
///
/// # Errors
///
/// Only on a generator invariant violation.
pub fn generate_license<R: Rng + ?Sized>(
    rng: &mut R,
    state: &StateCode,
    last_name: &str,
    license_type: LicenseType,
) -> Result<LicenseNumber, GenerationError> {
    let template = template_for(state, license_type);

    let mut value = String::with_capacity(template.total_len());
    match template.prefix {
        LicensePrefix::Literal(prefix) => value.push_str(prefix),
        LicensePrefix::SurnameInitial => value.push(surname_initial(last_name)),
    }
    let digits = random_digits(rng, template.digits);
    value.push_str(&digits);
    if template.check == LicenseCheck::Luhn {
        value.push(luhn::check_char_with_prefix("", &digits)?);
    }

    expect_len(value, template.total_len()).and_then(|value| {
        LicenseNumber::new(state.clone(), license_type, value).map_err(GenerationError::Rejected)
    })
}
