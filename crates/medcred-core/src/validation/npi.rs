//! NPI validation pipeline.

use std::sync::OnceLock;

use super::{all_digits, Pipeline};
use crate::checksum::luhn::{self, NPI_PREFIX};
use crate::credential::{EntityType, NpiNumber};
use crate::error::ValidationError;

/// The shared NPI pipeline.
pub fn pipeline() -> &'static Pipeline<'static> {
    static PIPELINE: OnceLock<Pipeline<'static>> = OnceLock::new();
    PIPELINE.get_or_init(|| {
        Pipeline::new()
            .non_empty()
            .exact_length(NpiNumber::LEN)
            .ensure(all_digits, ValidationError::NonNumeric)
            .ensure_with(
                |s| s.chars().next().and_then(EntityType::from_leading_digit).is_some(),
                |s| {
                    ValidationError::format(format!(
                        "leading digit must be 1 (individual) or 2 (organization), got {:?}",
                        s.chars().next().unwrap_or_default()
                    ))
                },
            )
            .ensure(
                |s| luhn::verify_with_prefix(NPI_PREFIX, s).is_ok(),
                ValidationError::ChecksumFailed,
            )
    })
}

/// Validate an NPI string.
///
/// # Errors
///
/// The first violated condition, in pipeline order.
pub fn validate(input: &str) -> Result<NpiNumber, ValidationError> {
    pipeline().run(input).map(|s| NpiNumber(s.to_string()))
}
