//! # medcred-cli — Command-Line Tool for Synthetic Medical Credentials
//!
//! Provides the `medcred` binary.
//!
//! ## Subcommands
//!
//! - `medcred npi`: Generate or validate NPI numbers.
//! - `medcred dea`: Generate or validate DEA / NDEA numbers.
//! - `medcred license`: Generate or validate state license numbers.
//! - `medcred history`: List recently issued credentials.
//! - `medcred templates`: Show the state license template registry.
//! - `medcred dispatch`: Route a tagged JSON command through the registry.
//!
//! ```bash
//! medcred npi generate --organization --count 3
//! medcred dea validate AB1234563 --last-name Baker
//! medcred license generate --state WA --type pharmacy --last-name Doe
//! medcred --database-url sqlite://creds.db history npi --limit 5
//! echo '{"command":"validate-npi","payload":{"npi":"1234567893"}}' | medcred dispatch
//! ```
//!
//! Generated values and validation verdicts go to stdout; diagnostics go to
//! stderr through `tracing`.

pub mod compose;
pub mod config;
pub mod dea;
pub mod dispatch;
pub mod history;
pub mod license;
pub mod npi;
pub mod templates;

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use medcred_core::{CredentialError, Outcome};
use medcred_service::dto::{ErrorResponse, ValidationResponse};
use serde::Serialize;

/// Upper bound for `--count`.
pub const MAX_BATCH: u32 = 10_000;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bare values, one per line.
    #[default]
    Text,
    /// One JSON payload per line.
    Json,
}

impl OutputFormat {
    /// Write either `text` or the JSON encoding of `payload`.
    pub fn emit<T: Serialize>(
        self,
        out: &mut impl Write,
        text: impl Display,
        payload: &T,
    ) -> Result<()> {
        match self {
            Self::Text => writeln!(out, "{text}")?,
            Self::Json => writeln!(out, "{}", serde_json::to_string(payload)?)?,
        }
        Ok(())
    }
}

/// Success or failure payload of a validation, as printed.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Verdict {
    Valid(ValidationResponse),
    Invalid(ErrorResponse),
}

/// Print a validation verdict and turn it into an exit code.
///
/// Invalid input is an expected outcome, not a command failure: it prints
/// the reason and yields exit code 1.
pub fn report_validation(
    out: &mut impl Write,
    format: OutputFormat,
    result: Result<ValidationResponse, CredentialError>,
) -> Result<u8> {
    let (code, text, verdict) = result.fold(
        |response| (0, "valid".to_string(), Verdict::Valid(response)),
        |error| {
            let text = format!("invalid: {error}");
            (1, text, Verdict::Invalid(ErrorResponse::new(&error)))
        },
    );
    format.emit(out, text, &verdict)?;
    Ok(code)
}
