//! # Jurisdiction Types — State Codes and License Templates
//!
//! State license numbers have no national format. Each `(state, license
//! type)` pair registered here declares a [`LicenseTemplate`]: a prefix,
//! a count of random digit slots, and optionally a Luhn check digit.
//!
//! ## Fallback Policy
//!
//! A recognised state without a registered template uses the generic
//! fallback for its license type: `MD` + 7 digits for medical licenses,
//! `RPH` + 7 digits for pharmacy licenses, no check digit. Unrecognised
//! state codes are rejected outright.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// USPS codes of the states, DC and the territories that license providers.
const STATE_CODES: &[&str] = &[
    "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "GU", "HI", "IA", "ID",
    "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND",
    "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "PR", "RI", "SC", "SD", "TN",
    "TX", "UT", "VA", "VI", "VT", "WA", "WI", "WV", "WY",
];

/// Two-letter USPS state or territory code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StateCode(String);

impl_validating_deserialize!(StateCode);

impl StateCode {
    /// Create a state code, trimming and upper-casing the input.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for blank input, `WrongLength` unless two characters,
    /// `FormatMismatch` for codes that are not a recognised USPS code.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        let actual = code.chars().count();
        if actual != 2 {
            return Err(ValidationError::WrongLength { expected: 2, actual });
        }
        if !STATE_CODES.contains(&code.as_str()) {
            return Err(ValidationError::format(format!("unknown state code {code:?}")));
        }
        Ok(Self(code))
    }

    /// Access the code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for StateCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Category of state license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    /// Physician / medical board license.
    Medical,
    /// Pharmacist license.
    Pharmacy,
}

impl LicenseType {
    /// All license types.
    pub const ALL: [LicenseType; 2] = [Self::Medical, Self::Pharmacy];

    /// Lower-case identifier used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Pharmacy => "pharmacy",
        }
    }
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LicenseType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medical" | "md" => Ok(Self::Medical),
            "pharmacy" | "rph" => Ok(Self::Pharmacy),
            "" => Err(ValidationError::EmptyInput),
            other => Err(ValidationError::format(format!("unknown license type {other:?}"))),
        }
    }
}

/// Leading part of a license number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicensePrefix {
    /// A fixed string, possibly empty.
    Literal(&'static str),
    /// The licensee's surname initial (one upper-case letter).
    SurnameInitial,
}

/// Check digit scheme declared by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseCheck {
    /// No check digit.
    None,
    /// Luhn check digit over the digit slots, appended last.
    Luhn,
}

/// Format template for one `(state, license type)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseTemplate {
    /// Leading part.
    pub prefix: LicensePrefix,
    /// Number of random digit slots after the prefix.
    pub digits: usize,
    /// Optional check digit after the digit slots.
    pub check: LicenseCheck,
}

impl LicenseTemplate {
    const fn new(prefix: LicensePrefix, digits: usize, check: LicenseCheck) -> Self {
        Self {
            prefix,
            digits,
            check,
        }
    }

    /// Length of the rendered prefix in characters.
    pub fn prefix_len(&self) -> usize {
        match self.prefix {
            LicensePrefix::Literal(p) => p.len(),
            LicensePrefix::SurnameInitial => 1,
        }
    }

    /// Number of trailing digits, including the check digit if any.
    pub fn numeric_len(&self) -> usize {
        match self.check {
            LicenseCheck::None => self.digits,
            LicenseCheck::Luhn => self.digits + 1,
        }
    }

    /// Total length of a license number under this template.
    pub fn total_len(&self) -> usize {
        self.prefix_len() + self.numeric_len()
    }

    /// Short human-readable description, e.g. `ME + 6 digits`.
    pub fn describe(&self) -> String {
        let prefix = match self.prefix {
            LicensePrefix::Literal("") => String::new(),
            LicensePrefix::Literal(p) => format!("{p} + "),
            LicensePrefix::SurnameInitial => "surname initial + ".to_string(),
        };
        let check = match self.check {
            LicenseCheck::None => "",
            LicenseCheck::Luhn => " + Luhn check digit",
        };
        format!("{prefix}{} digits{check}", self.digits)
    }
}

use LicenseCheck::{Luhn, None as NoCheck};
use LicensePrefix::{Literal, SurnameInitial};
use LicenseType::{Medical, Pharmacy};

/// Registered templates.
const TEMPLATES: &[(&str, LicenseType, LicenseTemplate)] = &[
    ("CA", Medical, LicenseTemplate::new(Literal("A"), 6, NoCheck)),
    ("CA", Pharmacy, LicenseTemplate::new(Literal("RPH"), 5, NoCheck)),
    ("FL", Medical, LicenseTemplate::new(Literal("ME"), 6, NoCheck)),
    ("FL", Pharmacy, LicenseTemplate::new(Literal("PS"), 6, NoCheck)),
    ("IL", Medical, LicenseTemplate::new(Literal("036"), 6, NoCheck)),
    ("IL", Pharmacy, LicenseTemplate::new(Literal("051"), 6, NoCheck)),
    ("MA", Medical, LicenseTemplate::new(Literal(""), 5, Luhn)),
    ("NY", Medical, LicenseTemplate::new(Literal(""), 6, NoCheck)),
    ("NY", Pharmacy, LicenseTemplate::new(Literal(""), 6, NoCheck)),
    ("PA", Medical, LicenseTemplate::new(Literal("MD"), 6, NoCheck)),
    ("PA", Pharmacy, LicenseTemplate::new(Literal("RP"), 6, NoCheck)),
    ("TX", Medical, LicenseTemplate::new(SurnameInitial, 4, NoCheck)),
    ("TX", Pharmacy, LicenseTemplate::new(Literal(""), 5, NoCheck)),
    ("WA", Medical, LicenseTemplate::new(Literal("MD"), 7, Luhn)),
    ("WA", Pharmacy, LicenseTemplate::new(Literal("PH"), 7, Luhn)),
];

const FALLBACK_MEDICAL: LicenseTemplate = LicenseTemplate::new(Literal("MD"), 7, NoCheck);
const FALLBACK_PHARMACY: LicenseTemplate = LicenseTemplate::new(Literal("RPH"), 7, NoCheck);

/// The generic template used for states without a registered one.
pub fn fallback_template(license_type: LicenseType) -> &'static LicenseTemplate {
    match license_type {
        Medical => &FALLBACK_MEDICAL,
        Pharmacy => &FALLBACK_PHARMACY,
    }
}

/// Look up the registered template, if any.
pub fn registered_template(
    state: &StateCode,
    license_type: LicenseType,
) -> Option<&'static LicenseTemplate> {
    TEMPLATES
        .iter()
        .find(|(code, ty, _)| *code == state.as_str() && *ty == license_type)
        .map(|(_, _, template)| template)
}

/// The template governing `(state, license_type)`, falling back to the
/// generic template when none is registered.
pub fn template_for(state: &StateCode, license_type: LicenseType) -> &'static LicenseTemplate {
    registered_template(state, license_type).unwrap_or_else(|| fallback_template(license_type))
}

/// All registered templates, in table order.
pub fn registered_templates(
) -> impl Iterator<Item = (&'static str, LicenseType, &'static LicenseTemplate)> {
    TEMPLATES.iter().map(|(code, ty, template)| (*code, *ty, template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_normalises_case_and_whitespace() {
        assert_eq!(StateCode::new(" fl ").unwrap().as_str(), "FL");
    }

    #[test]
    fn state_code_rejects_bad_input() {
        assert_eq!(StateCode::new(""), Err(ValidationError::EmptyInput));
        assert_eq!(
            StateCode::new("FLA"),
            Err(ValidationError::WrongLength { expected: 2, actual: 3 })
        );
        assert!(matches!(StateCode::new("ZZ"), Err(ValidationError::FormatMismatch(_))));
    }

    #[test]
    fn state_code_deserialize_validates() {
        let ok: StateCode = serde_json::from_str("\"tx\"").unwrap();
        assert_eq!(ok.as_str(), "TX");
        assert!(serde_json::from_str::<StateCode>("\"XX\"").is_err());
    }

    #[test]
    fn license_type_parses_aliases() {
        assert_eq!("Medical".parse::<LicenseType>(), Ok(LicenseType::Medical));
        assert_eq!("RPH".parse::<LicenseType>(), Ok(LicenseType::Pharmacy));
        assert!("dental".parse::<LicenseType>().is_err());
    }

    #[test]
    fn registered_template_lookup() {
        let fl = StateCode::new("FL").unwrap();
        let template = template_for(&fl, LicenseType::Medical);
        assert_eq!(template.prefix, LicensePrefix::Literal("ME"));
        assert_eq!(template.total_len(), 8);
        assert_eq!(template.describe(), "ME + 6 digits");
    }

    #[test]
    fn unregistered_state_uses_fallback() {
        let oh = StateCode::new("OH").unwrap();
        assert!(registered_template(&oh, LicenseType::Medical).is_none());
        assert_eq!(template_for(&oh, LicenseType::Medical), &FALLBACK_MEDICAL);
        assert_eq!(template_for(&oh, LicenseType::Pharmacy).describe(), "RPH + 7 digits");
    }

    #[test]
    fn luhn_templates_count_check_digit() {
        let wa = StateCode::new("WA").unwrap();
        let template = template_for(&wa, LicenseType::Medical);
        assert_eq!(template.numeric_len(), 8);
        assert_eq!(template.total_len(), 10);
        assert_eq!(template.describe(), "MD + 7 digits + Luhn check digit");
    }

    #[test]
    fn every_registered_state_is_a_known_code() {
        for (code, _, _) in registered_templates() {
            assert!(StateCode::new(code).is_ok(), "{code} not in STATE_CODES");
        }
    }
}
