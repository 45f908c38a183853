use medcred_core::checksum::dea::{self, BODY_LEN};
use medcred_core::{surname_initial, DeaNumber, GenerationError, RegistrantClass};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{expect_len, random_digits};

/// Generate a DEA (standard) or NDEA (narcotic treatment) number.
///
/// The registrant letter is drawn from the class's letters, the initial is
/// the surname initial (`X` when there is none), followed by six random
/// digits and the DEA check digit.
///
/// # Errors
///
/// Only on a generator invariant violation.
pub fn generate_dea<R: Rng + ?Sized>(
    rng: &mut R,
    last_name: &str,
    class: RegistrantClass,
) -> Result<DeaNumber, GenerationError> {
    let registrant = class.letters().choose(rng).copied().ok_or_else(|| {
        GenerationError::InvariantViolated(format!("no registrant letters for {class:?}"))
    })?;
    let body = random_digits(rng, BODY_LEN);
    let check = dea::check_char(&body)?;

    let mut value = String::with_capacity(DeaNumber::LEN);
    value.push(registrant);
    value.push(surname_initial(last_name));
    value.push_str(&body);
    value.push(check);

    expect_len(value, DeaNumber::LEN)
        .and_then(|value| DeaNumber::new(value).map_err(GenerationError::Rejected))
}
