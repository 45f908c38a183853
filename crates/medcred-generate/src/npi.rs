use medcred_core::checksum::luhn::{self, NPI_PREFIX};
use medcred_core::{EntityType, GenerationError, NpiNumber};
use rand::Rng;

use crate::{expect_len, random_digits};

/// Generate an NPI for the given entity type.
///
/// Digit 1 encodes the entity type, digits 2-9 are random, and digit 10 is
/// the Luhn check digit computed with the `80840` prefix.
///
/// # Errors
///
/// Only on a generator invariant violation.
pub fn generate_npi<R: Rng + ?Sized>(
    rng: &mut R,
    entity_type: EntityType,
) -> Result<NpiNumber, GenerationError> {
    let mut payload = String::with_capacity(NpiNumber::LEN);
    payload.push(entity_type.leading_digit());
    payload.push_str(&random_digits(rng, NpiNumber::LEN - 2));

    let check = luhn::check_char_with_prefix(NPI_PREFIX, &payload)?;
    payload.push(check);

    expect_len(payload, NpiNumber::LEN)
        .and_then(|value| NpiNumber::new(value).map_err(GenerationError::Rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcred_core::validation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn individual_npi_starts_with_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let npi = generate_npi(&mut rng, EntityType::Individual).unwrap();
        assert!(npi.as_str().starts_with('1'));
        assert_eq!(npi.entity_type(), EntityType::Individual);
    }

    #[test]
    fn organization_npi_starts_with_two() {
        let mut rng = StdRng::seed_from_u64(2);
        let npi = generate_npi(&mut rng, EntityType::Organization).unwrap();
        assert!(npi.as_str().starts_with('2'));
        assert_eq!(npi.entity_type(), EntityType::Organization);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_npi(&mut StdRng::seed_from_u64(99), EntityType::Individual).unwrap();
        let b = generate_npi(&mut StdRng::seed_from_u64(99), EntityType::Individual).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn many_generated_npis_validate() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for i in 0..500 {
            let entity = EntityType::from_organization_flag(i % 2 == 0);
            let npi = generate_npi(&mut rng, entity).unwrap();
            assert_eq!(npi.as_str().len(), 10);
            assert!(validation::npi::validate(npi.as_str()).is_ok(), "{npi}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Every generated NPI passes validation, for any seed.
            #[test]
            fn generated_npi_always_validates(seed in any::<u64>(), org in any::<bool>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                let npi = generate_npi(&mut rng, EntityType::from_organization_flag(org)).unwrap();
                prop_assert!(validation::npi::validate(npi.as_str()).is_ok());
            }
        }
    }
}
