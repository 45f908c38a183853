//! # medcred-generate — Synthetic Credential Generators
//!
//! Produces structurally valid NPI, DEA/NDEA and state license numbers for
//! test environments. Generated numbers are random, not unique, and carry no
//! security properties; they exist to pass format and checksum validation.
//!
//! Every generator takes the random source as a parameter, so tests pin
//! output with a seeded `StdRng` while production draws from entropy.
//!
//! Before returning, each generator routes the assembled string through the
//! value object constructor of its family. A generator bug therefore
//! surfaces as [`GenerationError::Rejected`] rather than as an invalid value.

mod dea;
mod license;
mod npi;

pub use dea::generate_dea;
pub use license::generate_license;
pub use npi::generate_npi;

use medcred_core::GenerationError;
use rand::Rng;

/// `count` uniformly random ASCII digits.
pub(crate) fn random_digits<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Guard against a generator assembling a string of the wrong shape.
pub(crate) fn expect_len(value: String, expected: usize) -> Result<String, GenerationError> {
    let actual = value.chars().count();
    if actual == expected {
        Ok(value)
    } else {
        Err(GenerationError::InvariantViolated(format!(
            "assembled {actual} characters, expected {expected}"
        )))
    }
}
