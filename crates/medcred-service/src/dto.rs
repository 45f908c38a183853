//! Request and response records exchanged with the dispatch layer.
//!
//! Field names are camelCase on the wire. Requests carry raw strings; the
//! service parses them into value objects so malformed input becomes a
//! typed `CredentialError` rather than a deserialization failure.

use serde::{Deserialize, Serialize};

/// Generate an NPI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateNpiRequest {
    /// Issue an organization (type 2) NPI instead of an individual one.
    #[serde(default)]
    pub is_organization: bool,
}

/// A freshly generated NPI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateNpiResponse {
    pub npi: String,
}

/// Validate an NPI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateNpiRequest {
    pub npi: String,
}

/// Generate a DEA or NDEA number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDeaRequest {
    /// Registrant surname; its initial becomes the second character.
    #[serde(default)]
    pub last_name: String,
    /// Issue a narcotic treatment program (NDEA) number.
    #[serde(default)]
    pub is_narcotic: bool,
}

/// A freshly generated DEA or NDEA number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDeaResponse {
    pub dea: String,
}

/// Validate a DEA or NDEA number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDeaRequest {
    pub dea: String,
    /// When present and non-blank, the number's initial must match it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Generate a state license number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLicenseRequest {
    pub state_code: String,
    #[serde(default)]
    pub last_name: String,
    /// `medical` or `pharmacy`.
    pub license_type: String,
}

/// A freshly generated license number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLicenseResponse {
    pub license_number: String,
}

/// Validate a state license number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateLicenseRequest {
    pub state_code: String,
    pub license_type: String,
    pub license_number: String,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
}

impl ValidationResponse {
    pub const VALID: Self = Self { is_valid: true };
}

/// Failure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
