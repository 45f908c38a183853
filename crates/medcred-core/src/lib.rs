//! # medcred-core — Foundational Types for Synthetic Medical Credentials
//!
//! This crate defines everything the rest of the workspace agrees on: the
//! railway combinators every fallible step is written in, the error
//! taxonomy, the checksum algorithms, the validated credential value
//! objects, the state license template registry, and the validation
//! pipelines. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for credential values.** `NpiNumber`, `DeaNumber`,
//!    `LicenseNumber` and `StateCode` have validated constructors only.
//!    Deserialization routes through the same constructors.
//!
//! 2. **Results, not exceptions.** Every fallible operation returns a
//!    `Result`. Panics from foreign code are converted at one boundary,
//!    [`outcome::try_wrap`] / [`outcome::try_wrap_async`].
//!
//! 3. **One pipeline per family.** NPI, DEA and license validation each run
//!    an ordered [`validation::Pipeline`] that reports the first violated
//!    condition and nothing after it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `medcred-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

/// Implement `Deserialize` for a validated newtype by deserializing a
/// `String` and routing it through the type's `new()` constructor.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod checksum;
pub mod credential;
pub mod error;
pub mod identity;
pub mod jurisdiction;
pub mod outcome;
pub mod temporal;
pub mod validation;

// Re-export primary types for ergonomic imports.
pub use credential::{
    surname_initial, CredentialKind, CredentialRecord, CredentialValue, DeaNumber, EntityType,
    IssuedCredential, LicenseNumber, LicenseScope, NpiNumber, RegistrantClass,
    PLACEHOLDER_INITIAL,
};
pub use error::{CredentialError, GenerationError, PersistenceError, ValidationError};
pub use identity::CredentialId;
pub use jurisdiction::{LicenseTemplate, LicenseType, StateCode};
pub use outcome::{try_wrap, try_wrap_async, Fault, Outcome};
pub use temporal::Timestamp;
