//! # Error Types — Structured Error Hierarchy
//!
//! The closed error taxonomy for medcred. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - [`ValidationError`] is credential-agnostic: the same `EmptyInput`
//!   is produced by the NPI, DEA and license pipelines.
//! - [`GenerationError`] is reserved for generator-internal invariant
//!   violations.
//! - [`PersistenceError`] carries a message and, for wrapped storage
//!   faults, the underlying cause.
//! - [`CredentialError`] is what callers see. Each service boundary
//!   converts the layer errors into it with `map_err`, tagging the
//!   credential kind so the message names the credential.

use std::sync::Arc;

use thiserror::Error;

use crate::credential::CredentialKind;

/// Shared, cloneable handle to an underlying failure.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Reasons a credential value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input was empty or whitespace only.
    #[error("value must not be empty")]
    EmptyInput,

    /// The input had the wrong number of characters.
    #[error("expected {expected} characters, got {actual}")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        actual: usize,
    },

    /// A position that must hold a decimal digit held something else.
    #[error("value must contain only digits where digits are required")]
    NonNumeric,

    /// The trailing check digit does not match the computed one.
    #[error("check digit does not match")]
    ChecksumFailed,

    /// The value does not follow the structural format of its credential.
    #[error("format mismatch: {0}")]
    FormatMismatch(String),
}

impl ValidationError {
    /// Helper for structural format violations.
    pub fn format(reason: impl Into<String>) -> Self {
        Self::FormatMismatch(reason.into())
    }
}

/// Generator-internal invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A generator assembled a value that breaks its own invariant.
    #[error("generator invariant violated: {0}")]
    InvariantViolated(String),

    /// A freshly generated value was rejected by its validation pipeline.
    #[error("generated value rejected by validation: {0}")]
    Rejected(#[from] ValidationError),
}

/// Failures reported by a persistence gateway.
#[derive(Error, Debug, Clone)]
pub enum PersistenceError {
    /// The insert did not durably store the record.
    #[error("insert failed: {message}")]
    InsertFailed {
        /// What went wrong.
        message: String,
        /// The storage fault, when one was caught.
        #[source]
        cause: Option<Cause>,
    },

    /// The store could not be opened or reached.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// What went wrong.
        message: String,
        /// The storage fault, when one was caught.
        #[source]
        cause: Option<Cause>,
    },
}

impl PersistenceError {
    /// Insert failure without an underlying cause.
    pub fn insert_failed(message: impl Into<String>) -> Self {
        Self::InsertFailed {
            message: message.into(),
            cause: None,
        }
    }

    /// Insert failure wrapping a storage fault.
    pub fn insert_failed_by(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InsertFailed {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    /// Store unavailable, wrapping a storage fault.
    pub fn unavailable_by(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    /// The insert reported zero affected rows.
    pub fn no_rows_affected() -> Self {
        Self::insert_failed("no rows affected")
    }
}

/// Credential-specific error returned to callers.
#[derive(Error, Debug, Clone)]
pub enum CredentialError {
    /// The supplied credential value is invalid.
    #[error("invalid {kind}: {source}")]
    Invalid {
        /// Credential family that was being validated.
        kind: CredentialKind,
        /// First violated condition.
        source: ValidationError,
    },

    /// A credential value could not be generated.
    #[error("could not generate {kind}: {source}")]
    Generation {
        /// Credential family that was being generated.
        kind: CredentialKind,
        /// Generator failure.
        source: GenerationError,
    },

    /// A generated credential could not be stored.
    #[error("could not store {kind}: {source}")]
    Persistence {
        /// Credential family that was being stored.
        kind: CredentialKind,
        /// Gateway failure.
        source: PersistenceError,
    },
}

impl CredentialError {
    /// Adapter for `map_err` at a validation boundary.
    pub fn invalid(kind: CredentialKind) -> impl Fn(ValidationError) -> Self {
        move |source| Self::Invalid { kind, source }
    }

    /// Adapter for `map_err` at a generation boundary.
    pub fn generation(kind: CredentialKind) -> impl Fn(GenerationError) -> Self {
        move |source| Self::Generation { kind, source }
    }

    /// Adapter for `map_err` at a persistence boundary.
    pub fn persistence(kind: CredentialKind) -> impl Fn(PersistenceError) -> Self {
        move |source| Self::Persistence { kind, source }
    }

    /// The credential family this error belongs to.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Invalid { kind, .. }
            | Self::Generation { kind, .. }
            | Self::Persistence { kind, .. } => *kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn validation_messages_are_human_readable() {
        assert_eq!(ValidationError::EmptyInput.to_string(), "value must not be empty");
        assert_eq!(
            ValidationError::WrongLength { expected: 10, actual: 9 }.to_string(),
            "expected 10 characters, got 9"
        );
        assert_eq!(
            ValidationError::format("unknown registrant letter 'Z'").to_string(),
            "format mismatch: unknown registrant letter 'Z'"
        );
    }

    #[test]
    fn credential_error_names_the_credential() {
        let err = CredentialError::invalid(CredentialKind::Npi)(ValidationError::ChecksumFailed);
        assert_eq!(err.to_string(), "invalid NPI: check digit does not match");
        assert_eq!(err.kind(), CredentialKind::Npi);
    }

    #[test]
    fn credential_error_exposes_source() {
        let err = CredentialError::invalid(CredentialKind::Dea)(ValidationError::NonNumeric);
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), ValidationError::NonNumeric.to_string());
    }

    #[test]
    fn no_rows_affected_is_insert_failure_without_cause() {
        let err = PersistenceError::no_rows_affected();
        match &err {
            PersistenceError::InsertFailed { message, cause } => {
                assert_eq!(message, "no rows affected");
                assert!(cause.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert!(err.source().is_none());
    }

    #[test]
    fn insert_failed_by_keeps_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = PersistenceError::insert_failed_by("write rejected", io);
        assert_eq!(err.to_string(), "insert failed: write rejected");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk full"));
    }

    #[test]
    fn generation_error_wraps_validation() {
        let err: GenerationError = ValidationError::ChecksumFailed.into();
        assert_eq!(
            err.to_string(),
            "generated value rejected by validation: check digit does not match"
        );
    }
}
