//! # License Subcommand
//!
//! - `generate`: Issue license numbers for a state and license type.
//! - `validate`: Check a license number against its state template.
//!
//! See `medcred templates` for the formats each state uses.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use medcred_service::dto::{GenerateLicenseRequest, ValidateLicenseRequest};
use medcred_service::CredentialService;
use medcred_store::CredentialGateway;

use crate::{report_validation, OutputFormat, MAX_BATCH};

/// Arguments for the `medcred license` subcommand.
#[derive(Args, Debug)]
pub struct LicenseArgs {
    #[command(subcommand)]
    pub command: LicenseCommand,
}

/// License subcommands.
#[derive(Subcommand, Debug)]
pub enum LicenseCommand {
    /// Generate license numbers.
    Generate {
        /// Two-letter state or territory code.
        #[arg(long)]
        state: String,
        /// License type: medical (md) or pharmacy (rph).
        #[arg(long = "type", default_value = "medical")]
        license_type: String,
        /// Licensee surname, used by templates that start with an initial.
        #[arg(long, default_value = "")]
        last_name: String,
        /// Number of license numbers to issue.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_BATCH as i64))]
        count: u32,
    },

    /// Validate a license number.
    Validate {
        /// Two-letter state or territory code.
        #[arg(long)]
        state: String,
        /// License type: medical (md) or pharmacy (rph).
        #[arg(long = "type", default_value = "medical")]
        license_type: String,
        /// The license number.
        license_number: String,
    },
}

/// Execute a license subcommand. Returns the process exit code.
pub async fn run_license<G: CredentialGateway>(
    args: &LicenseArgs,
    service: &CredentialService<G>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<u8> {
    match &args.command {
        LicenseCommand::Generate {
            state,
            license_type,
            last_name,
            count,
        } => {
            let request = GenerateLicenseRequest {
                state_code: state.clone(),
                last_name: last_name.clone(),
                license_type: license_type.clone(),
            };
            for _ in 0..*count {
                let response = service
                    .generate_license(&request)
                    .await
                    .with_context(|| format!("license generation for {state} failed"))?;
                format.emit(out, &response.license_number, &response)?;
            }
            Ok(0)
        }
        LicenseCommand::Validate {
            state,
            license_type,
            license_number,
        } => report_validation(
            out,
            format,
            service.validate_license(&ValidateLicenseRequest {
                state_code: state.clone(),
                license_type: license_type.clone(),
                license_number: license_number.clone(),
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcred_core::CredentialKind;
    use medcred_store::InMemoryGateway;

    fn generate(state: &str, license_type: &str, count: u32) -> LicenseArgs {
        LicenseArgs {
            command: LicenseCommand::Generate {
                state: state.into(),
                license_type: license_type.into(),
                last_name: "Ruiz".into(),
                count,
            },
        }
    }

    #[tokio::test]
    async fn generate_then_validate() {
        let service = CredentialService::seeded(InMemoryGateway::new(), 31);
        let mut out = Vec::new();
        run_license(&generate("TX", "md", 2), &service, OutputFormat::Text, &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(service.gateway().len(CredentialKind::License), 2);

        for number in text.lines() {
            assert!(number.starts_with('R'));
            let args = LicenseArgs {
                command: LicenseCommand::Validate {
                    state: "tx".into(),
                    license_type: "medical".into(),
                    license_number: number.into(),
                },
            };
            let mut sink = Vec::new();
            assert_eq!(
                run_license(&args, &service, OutputFormat::Text, &mut sink).await.unwrap(),
                0
            );
        }
    }

    #[tokio::test]
    async fn unknown_state_fails_generation() {
        let service = CredentialService::seeded(InMemoryGateway::new(), 32);
        let mut out = Vec::new();
        let err = run_license(&generate("QQ", "medical", 1), &service, OutputFormat::Text, &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "license generation for QQ failed");
        assert!(format!("{err:#}").contains("unknown state code"));
        assert!(service.gateway().is_empty());
    }
}
