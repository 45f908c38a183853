//! # Credential Service
//!
//! Orchestrates generation and validation for every credential family.
//!
//! Generation runs generator, issue, gateway `add`, then maps the issued
//! value into a response carrying only the generated string. Validation
//! runs the family's pipeline synchronously. At every boundary the error is
//! converted into a [`CredentialError`] tagged with the credential kind,
//! and every failure is logged by a `tap_error` hook before it is returned.
//!
//! ## Concurrency
//!
//! The random source sits behind a `parking_lot::Mutex`. The lock is held
//! only while a generator draws digits and is always released before the
//! gateway is awaited.

use std::str::FromStr;

use medcred_core::validation;
use medcred_core::{
    CredentialError, CredentialKind, CredentialRecord, CredentialValue, DeaNumber, EntityType,
    GenerationError, IssuedCredential, LicenseNumber, LicenseType, NpiNumber, Outcome,
    RegistrantClass, StateCode, ValidationError,
};
use medcred_generate::{generate_dea, generate_license, generate_npi};
use medcred_store::{CredentialGateway, CredentialLedger};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dto::{
    GenerateDeaRequest, GenerateDeaResponse, GenerateLicenseRequest, GenerateLicenseResponse,
    GenerateNpiRequest, GenerateNpiResponse, ValidateDeaRequest, ValidateLicenseRequest,
    ValidateNpiRequest, ValidationResponse,
};

/// Generation and validation entry points over a persistence gateway.
pub struct CredentialService<G> {
    gateway: G,
    rng: Mutex<StdRng>,
}

impl<G> std::fmt::Debug for CredentialService<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("gateway", &std::any::type_name::<G>())
            .field("rng", &"[StdRng]")
            .finish()
    }
}

impl<G> CredentialService<G> {
    /// Create a service drawing from `rng`.
    pub fn new(gateway: G, rng: StdRng) -> Self {
        Self {
            gateway,
            rng: Mutex::new(rng),
        }
    }

    /// Create a service seeded from OS entropy.
    pub fn from_entropy(gateway: G) -> Self {
        Self::new(gateway, StdRng::from_entropy())
    }

    /// Create a service with a reproducible random sequence.
    pub fn seeded(gateway: G, seed: u64) -> Self {
        Self::new(gateway, StdRng::seed_from_u64(seed))
    }

    /// The persistence gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn draw<V>(
        &self,
        generate: impl FnOnce(&mut StdRng) -> Result<V, GenerationError>,
    ) -> Result<V, GenerationError> {
        let mut rng = self.rng.lock();
        generate(&mut *rng)
    }

    /// Validate an NPI.
    ///
    /// # Errors
    ///
    /// `CredentialError::Invalid` carrying the first violated condition.
    pub fn validate_npi(
        &self,
        request: &ValidateNpiRequest,
    ) -> Result<ValidationResponse, CredentialError> {
        let kind = CredentialKind::Npi;
        observe_validation(
            kind,
            NpiNumber::new(&request.npi)
                .map(|_| ValidationResponse::VALID)
                .map_err(CredentialError::invalid(kind)),
        )
    }

    /// Validate a DEA or NDEA number, checking the initial against
    /// `lastName` when one is supplied.
    ///
    /// # Errors
    ///
    /// `CredentialError::Invalid` carrying the first violated condition.
    pub fn validate_dea(
        &self,
        request: &ValidateDeaRequest,
    ) -> Result<ValidationResponse, CredentialError> {
        let kind = dea_kind(&request.dea);
        let last_name = request
            .last_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let checked = match last_name {
            Some(name) => validation::dea::validate_for_surname(&request.dea, name),
            None => DeaNumber::new(&request.dea),
        };
        observe_validation(
            kind,
            checked
                .map(|_| ValidationResponse::VALID)
                .map_err(CredentialError::invalid(kind)),
        )
    }

    /// Validate a license number against its `(state, license type)` template.
    ///
    /// # Errors
    ///
    /// `CredentialError::Invalid` for an unknown state or license type, or
    /// the first violated template condition.
    pub fn validate_license(
        &self,
        request: &ValidateLicenseRequest,
    ) -> Result<ValidationResponse, CredentialError> {
        let kind = CredentialKind::License;
        observe_validation(
            kind,
            parse_scope(&request.state_code, &request.license_type)
                .and_then(|(state, license_type)| {
                    LicenseNumber::new(state, license_type, &request.license_number)
                })
                .map(|_| ValidationResponse::VALID)
                .map_err(CredentialError::invalid(kind)),
        )
    }
}

impl<G: CredentialGateway> CredentialService<G> {
    /// Generate, persist and return an NPI.
    ///
    /// # Errors
    ///
    /// `CredentialError::Generation` or `CredentialError::Persistence`.
    pub async fn generate_npi(
        &self,
        request: &GenerateNpiRequest,
    ) -> Result<GenerateNpiResponse, CredentialError> {
        let entity_type = EntityType::from_organization_flag(request.is_organization);
        self.issue(CredentialKind::Npi, |rng| generate_npi(rng, entity_type))
            .await
            .map(|issued| GenerateNpiResponse {
                npi: issued.into_value().to_string(),
            })
    }

    /// Generate, persist and return a DEA (or, for narcotic requests, NDEA) number.
    ///
    /// # Errors
    ///
    /// `CredentialError::Generation` or `CredentialError::Persistence`.
    pub async fn generate_dea(
        &self,
        request: &GenerateDeaRequest,
    ) -> Result<GenerateDeaResponse, CredentialError> {
        let class = RegistrantClass::from_narcotic_flag(request.is_narcotic);
        self.issue(class.kind(), |rng| generate_dea(rng, &request.last_name, class))
            .await
            .map(|issued| GenerateDeaResponse {
                dea: issued.into_value().to_string(),
            })
    }

    /// Generate, persist and return a state license number.
    ///
    /// # Errors
    ///
    /// `CredentialError::Invalid` for an unknown state or license type,
    /// otherwise `CredentialError::Generation` or `CredentialError::Persistence`.
    pub async fn generate_license(
        &self,
        request: &GenerateLicenseRequest,
    ) -> Result<GenerateLicenseResponse, CredentialError> {
        let kind = CredentialKind::License;
        let (state, license_type) = parse_scope(&request.state_code, &request.license_type)
            .map_err(CredentialError::invalid(kind))
            .tap_error(log_generation_failure)?;
        self.issue(kind, |rng| {
            generate_license(rng, &state, &request.last_name, license_type)
        })
        .await
        .map(|issued| GenerateLicenseResponse {
            license_number: issued.into_value().to_string(),
        })
    }

    async fn issue<V: CredentialValue>(
        &self,
        kind: CredentialKind,
        generate: impl FnOnce(&mut StdRng) -> Result<V, GenerationError>,
    ) -> Result<IssuedCredential<V>, CredentialError> {
        let issued = self
            .draw(generate)
            .map(IssuedCredential::issue)
            .map_err(CredentialError::generation(kind))
            .tap_error(log_generation_failure)?;
        let record = issued.to_record();
        self.gateway
            .add(&record)
            .await
            .map(|()| issued)
            .map_err(CredentialError::persistence(kind))
            .tap(|issued| {
                metrics::counter!("medcred_credentials_issued_total", "kind" => kind.as_str())
                    .increment(1);
                tracing::info!(kind = %kind, id = %issued.id(), "credential issued");
            })
            .tap_error(log_generation_failure)
    }
}

impl<G: CredentialLedger> CredentialService<G> {
    /// Recently issued credentials of `kind`, newest first.
    ///
    /// # Errors
    ///
    /// `CredentialError::Persistence` if the store cannot be read.
    pub async fn history(
        &self,
        kind: CredentialKind,
        limit: usize,
    ) -> Result<Vec<CredentialRecord>, CredentialError> {
        self.gateway
            .recent(kind, limit)
            .await
            .map_err(CredentialError::persistence(kind))
            .tap_error(|e| tracing::warn!(kind = %kind, error = %e, "could not read history"))
    }
}

/// Credential kind a DEA-shaped input claims to be, from its registrant letter.
fn dea_kind(input: &str) -> CredentialKind {
    input
        .trim()
        .chars()
        .next()
        .and_then(RegistrantClass::from_letter)
        .map_or(CredentialKind::Dea, |class| class.kind())
}

fn parse_scope(
    state_code: &str,
    license_type: &str,
) -> Result<(StateCode, LicenseType), ValidationError> {
    StateCode::new(state_code)
        .and_then(|state| LicenseType::from_str(license_type).map(|ty| (state, ty)))
}

fn log_generation_failure(error: &CredentialError) {
    tracing::warn!(kind = %error.kind(), error = %error, "credential generation failed");
}

fn observe_validation<T>(
    kind: CredentialKind,
    result: Result<T, CredentialError>,
) -> Result<T, CredentialError> {
    result
        .tap(|_| {
            metrics::counter!("medcred_validations_total", "kind" => kind.as_str(), "outcome" => "valid")
                .increment(1);
        })
        .tap_error(|e| {
            metrics::counter!("medcred_validations_total", "kind" => kind.as_str(), "outcome" => "invalid")
                .increment(1);
            tracing::info!(kind = %kind, error = %e, "validation rejected input");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcred_core::PersistenceError;
    use medcred_store::InMemoryGateway;

    /// Gateway that refuses every insert.
    struct RefusingGateway;

    impl CredentialGateway for RefusingGateway {
        async fn add(&self, _record: &CredentialRecord) -> Result<(), PersistenceError> {
            Err(PersistenceError::no_rows_affected())
        }
    }

    fn service() -> CredentialService<InMemoryGateway> {
        CredentialService::seeded(InMemoryGateway::new(), 7)
    }

    #[tokio::test]
    async fn generate_npi_persists_and_validates() {
        let service = service();
        let response = service
            .generate_npi(&GenerateNpiRequest {
                is_organization: true,
            })
            .await
            .unwrap();
        assert!(response.npi.starts_with('2'));
        assert_eq!(service.gateway().len(CredentialKind::Npi), 1);
        assert_eq!(
            service.validate_npi(&ValidateNpiRequest { npi: response.npi }).unwrap(),
            ValidationResponse::VALID
        );
    }

    #[tokio::test]
    async fn narcotic_dea_goes_to_ndea_table() {
        let service = service();
        let response = service
            .generate_dea(&GenerateDeaRequest {
                last_name: "Smith".into(),
                is_narcotic: true,
            })
            .await
            .unwrap();
        assert!(matches!(response.dea.chars().next(), Some('M' | 'P')));
        assert_eq!(&response.dea[1..2], "S");
        assert_eq!(service.gateway().len(CredentialKind::Ndea), 1);
        assert_eq!(service.gateway().len(CredentialKind::Dea), 0);
    }

    #[tokio::test]
    async fn seeded_services_agree() {
        let a = service().generate_npi(&GenerateNpiRequest::default()).await.unwrap();
        let b = service().generate_npi(&GenerateNpiRequest::default()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn generate_license_rejects_unknown_state() {
        let err = service()
            .generate_license(&GenerateLicenseRequest {
                state_code: "ZZ".into(),
                last_name: "Doe".into(),
                license_type: "medical".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CredentialError::Invalid {
                kind: CredentialKind::License,
                source: ValidationError::FormatMismatch(_),
            }
        ));
    }

    #[tokio::test]
    async fn generate_license_round_trip() {
        let service = service();
        let response = service
            .generate_license(&GenerateLicenseRequest {
                state_code: "wa".into(),
                last_name: "Doe".into(),
                license_type: "pharmacy".into(),
            })
            .await
            .unwrap();
        assert!(response.license_number.starts_with("PH"));
        let check = service.validate_license(&ValidateLicenseRequest {
            state_code: "WA".into(),
            license_type: "pharmacy".into(),
            license_number: response.license_number,
        });
        assert_eq!(check.unwrap(), ValidationResponse::VALID);
        assert_eq!(service.gateway().len(CredentialKind::License), 1);
    }

    #[tokio::test]
    async fn persistence_failure_is_tagged_with_kind() {
        let service = CredentialService::seeded(RefusingGateway, 1);
        let err = service
            .generate_dea(&GenerateDeaRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CredentialKind::Dea);
        assert_eq!(err.to_string(), "could not store DEA number: insert failed: no rows affected");
    }

    #[test]
    fn empty_npi_becomes_credential_error() {
        let err = service()
            .validate_npi(&ValidateNpiRequest { npi: String::new() })
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid NPI: value must not be empty");
    }

    #[test]
    fn dea_surname_check_is_optional() {
        let service = service();
        let request = |last_name: Option<&str>| ValidateDeaRequest {
            dea: "AS1234563".into(),
            last_name: last_name.map(String::from),
        };
        assert!(service.validate_dea(&request(None)).is_ok());
        assert!(service.validate_dea(&request(Some("  "))).is_ok());
        assert!(service.validate_dea(&request(Some("Smith"))).is_ok());
        assert!(service.validate_dea(&request(Some("Jones"))).is_err());
    }

    #[test]
    fn ndea_errors_are_tagged_ndea() {
        let err = service()
            .validate_dea(&ValidateDeaRequest {
                dea: "MS1234564".into(),
                last_name: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), CredentialKind::Ndea);
        assert_eq!(err.to_string(), "invalid NDEA number: check digit does not match");
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let service = service();
        let first = service.generate_npi(&GenerateNpiRequest::default()).await.unwrap();
        let second = service.generate_npi(&GenerateNpiRequest::default()).await.unwrap();
        let history = service.history(CredentialKind::Npi, 10).await.unwrap();
        let values: Vec<_> = history.into_iter().map(|r| r.value).collect();
        assert_eq!(values, vec![second.npi, first.npi]);
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn issued_npi_validates(seed in any::<u64>(), is_organization in any::<bool>()) {
                let service = CredentialService::seeded(InMemoryGateway::new(), seed);
                let issued = block_on(service.generate_npi(&GenerateNpiRequest { is_organization })).unwrap();
                prop_assert_eq!(
                    service.validate_npi(&ValidateNpiRequest { npi: issued.npi }).unwrap(),
                    ValidationResponse::VALID
                );
            }

            #[test]
            fn issued_dea_validates_against_its_surname(
                seed in any::<u64>(),
                last_name in "[A-Za-z]{1,12}",
                is_narcotic in any::<bool>(),
            ) {
                let service = CredentialService::seeded(InMemoryGateway::new(), seed);
                let issued = block_on(service.generate_dea(&GenerateDeaRequest {
                    last_name: last_name.clone(),
                    is_narcotic,
                }))
                .unwrap();
                let kind = if is_narcotic { CredentialKind::Ndea } else { CredentialKind::Dea };
                prop_assert_eq!(service.gateway().len(kind), 1);
                prop_assert_eq!(
                    service
                        .validate_dea(&ValidateDeaRequest {
                            dea: issued.dea,
                            last_name: Some(last_name),
                        })
                        .unwrap(),
                    ValidationResponse::VALID
                );
            }

            #[test]
            fn issued_license_validates(
                seed in any::<u64>(),
                state_code in prop::sample::select(vec!["CA", "FL", "IL", "MA", "NY", "PA", "TX", "WA", "OH"]),
                license_type in prop::sample::select(vec!["medical", "pharmacy"]),
            ) {
                let service = CredentialService::seeded(InMemoryGateway::new(), seed);
                let issued = block_on(service.generate_license(&GenerateLicenseRequest {
                    state_code: state_code.into(),
                    last_name: "Okafor".into(),
                    license_type: license_type.into(),
                }))
                .unwrap();
                prop_assert_eq!(
                    service
                        .validate_license(&ValidateLicenseRequest {
                            state_code: state_code.into(),
                            license_type: license_type.into(),
                            license_number: issued.license_number,
                        })
                        .unwrap(),
                    ValidationResponse::VALID
                );
            }
        }
    }
}
