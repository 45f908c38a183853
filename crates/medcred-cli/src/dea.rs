//! # DEA Subcommand
//!
//! - `generate`: Issue DEA numbers (`--narcotic` for NDEA registrants).
//! - `validate`: Check a DEA number, optionally against a surname.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use medcred_service::dto::{GenerateDeaRequest, ValidateDeaRequest};
use medcred_service::CredentialService;
use medcred_store::CredentialGateway;

use crate::{report_validation, OutputFormat, MAX_BATCH};

/// Arguments for the `medcred dea` subcommand.
#[derive(Args, Debug)]
pub struct DeaArgs {
    #[command(subcommand)]
    pub command: DeaCommand,
}

/// DEA subcommands.
#[derive(Subcommand, Debug)]
pub enum DeaCommand {
    /// Generate DEA or NDEA numbers.
    Generate {
        /// Registrant surname; its initial is the second character.
        #[arg(long, default_value = "")]
        last_name: String,
        /// Issue narcotic treatment program (NDEA) numbers, letters M or P.
        #[arg(long)]
        narcotic: bool,
        /// Number of DEA numbers to issue.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_BATCH as i64))]
        count: u32,
    },

    /// Validate a DEA or NDEA number.
    Validate {
        /// The 9-character DEA number.
        dea: String,
        /// Require the number's initial to match this surname.
        #[arg(long)]
        last_name: Option<String>,
    },
}

/// Execute a DEA subcommand. Returns the process exit code.
pub async fn run_dea<G: CredentialGateway>(
    args: &DeaArgs,
    service: &CredentialService<G>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<u8> {
    match &args.command {
        DeaCommand::Generate {
            last_name,
            narcotic,
            count,
        } => {
            let request = GenerateDeaRequest {
                last_name: last_name.clone(),
                is_narcotic: *narcotic,
            };
            for _ in 0..*count {
                let response = service
                    .generate_dea(&request)
                    .await
                    .context("DEA generation failed")?;
                format.emit(out, &response.dea, &response)?;
            }
            Ok(0)
        }
        DeaCommand::Validate { dea, last_name } => report_validation(
            out,
            format,
            service.validate_dea(&ValidateDeaRequest {
                dea: dea.clone(),
                last_name: last_name.clone(),
            }),
        ),
    }
}
