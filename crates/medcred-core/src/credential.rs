//! # Credential Value Objects
//!
//! Validated newtypes for the three credential families, plus the
//! [`IssuedCredential`] envelope that stamps an identity key and creation
//! time onto a value exactly once.
//!
//! Every constructor routes through the matching pipeline in
//! [`crate::validation`], so holding an [`NpiNumber`], [`DeaNumber`] or
//! [`LicenseNumber`] is proof that its invariant holds. Deserialization goes
//! through the same constructors.
//!
//! ## Ownership
//!
//! An [`IssuedCredential`] is owned by the service call that issued it.
//! Persisting it hands a [`CredentialRecord`] copy to the gateway; the
//! issued value stays a read-only view for building the response.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::CredentialId;
use crate::jurisdiction::{LicenseType, StateCode};
use crate::temporal::Timestamp;
use crate::validation;

/// Placeholder initial for an empty or non-alphabetic surname.
pub const PLACEHOLDER_INITIAL: char = 'X';

/// Upper-case initial of a surname, or [`PLACEHOLDER_INITIAL`].
pub fn surname_initial(last_name: &str) -> char {
    last_name
        .trim()
        .chars()
        .next()
        .filter(char::is_ascii_alphabetic)
        .map_or(PLACEHOLDER_INITIAL, |c| c.to_ascii_uppercase())
}

// ---------------------------------------------------------------------------
// Credential kinds
// ---------------------------------------------------------------------------

/// Credential family. Each family is persisted to its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// National Provider Identifier.
    Npi,
    /// Standard DEA registration number.
    Dea,
    /// Narcotic-treatment (NDEA) registration number.
    Ndea,
    /// State license number.
    License,
}

impl CredentialKind {
    /// All credential kinds.
    pub const ALL: [CredentialKind; 4] = [Self::Npi, Self::Dea, Self::Ndea, Self::License];

    /// Lower-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npi => "npi",
            Self::Dea => "dea",
            Self::Ndea => "ndea",
            Self::License => "license",
        }
    }

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Npi => "npi_numbers",
            Self::Dea => "dea_numbers",
            Self::Ndea => "ndea_numbers",
            Self::License => "license_numbers",
        }
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Npi => "NPI",
            Self::Dea => "DEA number",
            Self::Ndea => "NDEA number",
            Self::License => "license number",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for CredentialKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::format(format!("unknown credential kind {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// NPI
// ---------------------------------------------------------------------------

/// NPI entity type, encoded in the first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Individual provider, leading digit `1`.
    Individual,
    /// Organization provider, leading digit `2`.
    Organization,
}

impl EntityType {
    /// Entity type for an organization flag.
    pub fn from_organization_flag(is_organization: bool) -> Self {
        if is_organization {
            Self::Organization
        } else {
            Self::Individual
        }
    }

    /// Leading NPI digit.
    pub fn leading_digit(&self) -> char {
        match self {
            Self::Individual => '1',
            Self::Organization => '2',
        }
    }

    /// Entity type encoded by a leading digit.
    pub fn from_leading_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Individual),
            '2' => Some(Self::Organization),
            _ => None,
        }
    }
}

/// A 10-digit National Provider Identifier with a valid Luhn check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NpiNumber(pub(crate) String);

impl_validating_deserialize!(NpiNumber);

impl NpiNumber {
    /// Number of characters in an NPI.
    pub const LEN: usize = 10;

    /// Validate and wrap an NPI.
    ///
    /// # Errors
    ///
    /// The first violated condition of [`validation::npi::validate`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        validation::npi::validate(value.as_ref())
    }

    /// Access the NPI string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Entity type encoded in the first digit.
    pub fn entity_type(&self) -> EntityType {
        if self.0.starts_with('2') {
            EntityType::Organization
        } else {
            EntityType::Individual
        }
    }
}

impl std::fmt::Display for NpiNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// DEA / NDEA
// ---------------------------------------------------------------------------

/// Registrant category encoded in the first letter of a DEA number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrantClass {
    /// Standard registrants, letters `A` through `F`.
    Standard,
    /// Narcotic treatment programs (NDEA), letters `M` and `P`.
    NarcoticTreatment,
}

impl RegistrantClass {
    /// Class for a narcotic flag.
    pub fn from_narcotic_flag(is_narcotic: bool) -> Self {
        if is_narcotic {
            Self::NarcoticTreatment
        } else {
            Self::Standard
        }
    }

    /// Registrant letters belonging to this class.
    pub fn letters(&self) -> &'static [char] {
        match self {
            Self::Standard => &['A', 'B', 'C', 'D', 'E', 'F'],
            Self::NarcoticTreatment => &['M', 'P'],
        }
    }

    /// Class of a registrant letter, if it belongs to one.
    pub fn from_letter(c: char) -> Option<Self> {
        [Self::Standard, Self::NarcoticTreatment]
            .into_iter()
            .find(|class| class.letters().contains(&c))
    }

    /// Credential kind issued for this class.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Standard => CredentialKind::Dea,
            Self::NarcoticTreatment => CredentialKind::Ndea,
        }
    }
}

/// A 9-character DEA / NDEA registration number with a valid check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeaNumber(pub(crate) String);

impl_validating_deserialize!(DeaNumber);

impl DeaNumber {
    /// Number of characters in a DEA number.
    pub const LEN: usize = 9;

    /// Validate and wrap a DEA number.
    ///
    /// # Errors
    ///
    /// The first violated condition of [`validation::dea::validate`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        validation::dea::validate(value.as_ref())
    }

    /// Access the DEA number string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Registrant letter (first character).
    pub fn registrant_letter(&self) -> char {
        self.0.chars().next().unwrap_or(PLACEHOLDER_INITIAL)
    }

    /// Registrant class derived from the first letter.
    pub fn registrant_class(&self) -> RegistrantClass {
        RegistrantClass::from_letter(self.registrant_letter()).unwrap_or(RegistrantClass::Standard)
    }

    /// Surname initial (second character).
    pub fn initial(&self) -> char {
        self.0.chars().nth(1).unwrap_or(PLACEHOLDER_INITIAL)
    }
}

impl std::fmt::Display for DeaNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// State license
// ---------------------------------------------------------------------------

/// The `(state, license type)` scope a license number belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseScope {
    /// Issuing state.
    pub state_code: StateCode,
    /// License category.
    pub license_type: LicenseType,
}

/// A state license number matching its `(state, license type)` template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseNumber {
    pub(crate) scope: LicenseScope,
    pub(crate) value: String,
}

impl LicenseNumber {
    /// Validate `value` against the template for `(state, license_type)`.
    ///
    /// # Errors
    ///
    /// The first violated condition of [`validation::license::validate`].
    pub fn new(
        state: StateCode,
        license_type: LicenseType,
        value: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        validation::license::validate(state, license_type, value.as_ref())
    }

    /// Issuing state.
    pub fn state(&self) -> &StateCode {
        &self.scope.state_code
    }

    /// License category.
    pub fn license_type(&self) -> LicenseType {
        self.scope.license_type
    }

    /// Scope of this license.
    pub fn scope(&self) -> &LicenseScope {
        &self.scope
    }

    /// Access the license number string.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for LicenseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

// ---------------------------------------------------------------------------
// Issued credentials
// ---------------------------------------------------------------------------

/// Common view over validated credential values.
pub trait CredentialValue {
    /// Family this value belongs to.
    fn kind(&self) -> CredentialKind;

    /// The credential string.
    fn value_str(&self) -> &str;

    /// License scope, for license numbers only.
    fn license_scope(&self) -> Option<&LicenseScope> {
        None
    }
}

impl CredentialValue for NpiNumber {
    fn kind(&self) -> CredentialKind {
        CredentialKind::Npi
    }

    fn value_str(&self) -> &str {
        self.as_str()
    }
}

impl CredentialValue for DeaNumber {
    fn kind(&self) -> CredentialKind {
        self.registrant_class().kind()
    }

    fn value_str(&self) -> &str {
        self.as_str()
    }
}

impl CredentialValue for LicenseNumber {
    fn kind(&self) -> CredentialKind {
        CredentialKind::License
    }

    fn value_str(&self) -> &str {
        self.as_str()
    }

    fn license_scope(&self) -> Option<&LicenseScope> {
        Some(&self.scope)
    }
}

/// A credential value with its identity key and creation time.
///
/// Fields are private and assigned once in [`IssuedCredential::issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential<V> {
    id: CredentialId,
    value: V,
    created_at: Timestamp,
}

impl<V: CredentialValue> IssuedCredential<V> {
    /// Stamp a fresh identity key and the current time onto `value`.
    pub fn issue(value: V) -> Self {
        Self {
            id: CredentialId::new(),
            value,
            created_at: Timestamp::now(),
        }
    }

    /// Identity key.
    pub fn id(&self) -> CredentialId {
        self.id
    }

    /// The credential value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Owned copy handed to the persistence gateway.
    pub fn to_record(&self) -> CredentialRecord {
        CredentialRecord {
            kind: self.value.kind(),
            id: self.id,
            value: self.value.value_str().to_string(),
            created_at: self.created_at,
            license: self.value.license_scope().cloned(),
        }
    }

    /// Unwrap the credential value.
    pub fn into_value(self) -> V {
        self.value
    }
}

/// Persisted form of an issued credential: one row of its kind's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Credential family (selects the table).
    pub kind: CredentialKind,
    /// Identity key.
    pub id: CredentialId,
    /// The generated string.
    pub value: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// License scope, present only for license records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseScope>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surname_initial_rules() {
        assert_eq!(surname_initial("smith"), 'S');
        assert_eq!(surname_initial("  o'neil"), 'O');
        assert_eq!(surname_initial(""), PLACEHOLDER_INITIAL);
        assert_eq!(surname_initial("   "), PLACEHOLDER_INITIAL);
        assert_eq!(surname_initial("Ángel"), PLACEHOLDER_INITIAL);
        assert_eq!(surname_initial("9lives"), PLACEHOLDER_INITIAL);
    }

    #[test]
    fn kind_parse_and_display() {
        assert_eq!("NDEA".parse::<CredentialKind>(), Ok(CredentialKind::Ndea));
        assert!("passport".parse::<CredentialKind>().is_err());
        assert_eq!(CredentialKind::Npi.to_string(), "NPI");
        assert_eq!(CredentialKind::License.table(), "license_numbers");
    }

    #[test]
    fn npi_entity_type() {
        assert_eq!(NpiNumber::new("1234567893").unwrap().entity_type(), EntityType::Individual);
        assert_eq!(EntityType::from_leading_digit('2'), Some(EntityType::Organization));
        assert_eq!(EntityType::from_leading_digit('3'), None);
    }

    #[test]
    fn npi_deserialize_validates() {
        let ok: NpiNumber = serde_json::from_str("\"1234567893\"").unwrap();
        assert_eq!(ok.as_str(), "1234567893");
        assert!(serde_json::from_str::<NpiNumber>("\"1234567890\"").is_err());
    }

    #[test]
    fn dea_accessors() {
        let dea = DeaNumber::new("MS1234563").unwrap();
        assert_eq!(dea.registrant_letter(), 'M');
        assert_eq!(dea.initial(), 'S');
        assert_eq!(dea.registrant_class(), RegistrantClass::NarcoticTreatment);
        assert_eq!(dea.kind(), CredentialKind::Ndea);
        assert_eq!(DeaNumber::new("AS1234563").unwrap().kind(), CredentialKind::Dea);
    }

    #[test]
    fn registrant_letters() {
        assert_eq!(RegistrantClass::from_letter('C'), Some(RegistrantClass::Standard));
        assert_eq!(RegistrantClass::from_letter('P'), Some(RegistrantClass::NarcoticTreatment));
        assert_eq!(RegistrantClass::from_letter('Z'), None);
    }

    #[test]
    fn issued_credential_record_copy() {
        let issued = IssuedCredential::issue(NpiNumber::new("1234567893").unwrap());
        let record = issued.to_record();
        assert_eq!(record.kind, CredentialKind::Npi);
        assert_eq!(record.id, issued.id());
        assert_eq!(record.value, "1234567893");
        assert_eq!(record.created_at, issued.created_at());
        assert!(record.license.is_none());
    }

    #[test]
    fn license_record_carries_scope() {
        let state = StateCode::new("FL").unwrap();
        let license = LicenseNumber::new(state.clone(), LicenseType::Medical, "ME123456").unwrap();
        let record = IssuedCredential::issue(license).to_record();
        let scope = record.license.expect("scope");
        assert_eq!(scope.state_code, state);
        assert_eq!(scope.license_type, LicenseType::Medical);
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = IssuedCredential::issue(NpiNumber::new("1234567893").unwrap()).to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "npi");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("license").is_none());
    }
}
